use std::sync::OnceLock;

use regex::{Captures, Regex};

/// `{{ env.VAR }}` with an optional `| default("x")`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Substitute environment placeholders in raw config text
///
/// Comment lines are copied untouched, so a commented-out key may name a
/// variable that is not set.
pub fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            expand_line(line, &mut output)?;
        }
    }

    Ok(output)
}

fn expand_line(line: &str, output: &mut String) -> anyhow::Result<()> {
    let mut copied = 0;

    for captures in placeholder().captures_iter(line) {
        let Some(whole) = captures.get(0) else { continue };
        output.push_str(&line[copied..whole.start()]);
        output.push_str(&resolve(&captures)?);
        copied = whole.end();
    }

    output.push_str(&line[copied..]);
    Ok(())
}

fn resolve(captures: &Captures<'_>) -> anyhow::Result<String> {
    let key = &captures[1];
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        anyhow::bail!("only variables scoped with 'env.' are supported: `{key}`");
    };

    match (std::env::var(name), captures.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => anyhow::bail!("environment variable not found: `{name}`"),
    }
}
