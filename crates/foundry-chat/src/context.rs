//! Compact line-oriented encoding of the venture snapshot.
//!
//! The LLM context is sent as indented `key: value` lines instead of JSON:
//! fewer tokens, still unambiguous to a language model. The list of ventures
//! flattens to repeated `venture:` blocks.

use std::fmt::Write as _;

use foundry_ventures::Venture;

const INDENT: &str = "  ";

/// Renders the snapshot into the prompt context block. Field order follows
/// the record's declaration order; metric keys are emitted in the map's
/// sorted order, so identical input always yields identical bytes.
pub fn render_context(ventures: &[Venture]) -> String {
    let mut out = String::new();
    for venture in ventures {
        out.push_str("venture:\n");
        push_line(&mut out, 1, "id", &venture.id.to_string());
        push_line(&mut out, 1, "name", &venture.name);
        push_line(&mut out, 1, "pod", &venture.pod);
        push_line(&mut out, 1, "stage", &venture.stage);
        push_line(&mut out, 1, "founder", &venture.founder);
        push_line(&mut out, 1, "status", &venture.status);
        push_line(&mut out, 1, "last_update", &venture.last_update.to_string());
        out.push_str(INDENT);
        out.push_str("metrics:\n");
        for (key, value) in &venture.metrics {
            push_line(&mut out, 2, key, &format_metric(*value));
        }
    }
    out
}

fn push_line(out: &mut String, depth: usize, key: &str, value: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    let _ = writeln!(out, "{key}: {value}");
}

/// Integral values print without a fractional part; `45000`, not `45000.0`.
fn format_metric(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
