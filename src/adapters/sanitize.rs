//! Log redaction for patient data.
//!
//! Every formatted log line passes through `SanitizingMakeWriter`, which
//! scrubs anything that looks like a patient record before it reaches the
//! sink:
//! - feature-vector dumps (`[2.0, 1.0, 1.0, ...]`)
//! - form field assignments (`age=68`, `spo2: 91`, `smoking=Current`)
//! - UUIDs and e-mail addresses
//!
//! Call sites should still avoid logging inputs at all; this only catches
//! what slips through. Input per call is capped (`AEROLUNG_SANITIZE_MAX_BYTES`,
//! default 16 KiB).

use std::io::Write;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_MAX_BYTES: usize = 16 * 1024;

/// Written in place of a line when the patterns failed to compile.
const UNSANITIZED_LINE: &str = "[REDACTED-LINE]";

const RULES: &[(&str, &str)] = &[
    // Five or more comma-separated numbers in brackets.
    (
        r"\[\s*-?\d+(?:\.\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?){4,}\s*\]",
        "[REDACTED-FEATURES]",
    ),
    (
        r"(?i)\b(age|spo2|energy|immunity|smoking|breathing_issue|throat_discomfort|pollution|family_cancer|family_smoking)\s*[:=]\s*[A-Za-z0-9.]+",
        "${1}=[REDACTED]",
    ),
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
];

struct Redactions {
    any: RegexSet,
    each: Vec<(Regex, &'static str)>,
}

impl Redactions {
    fn compile() -> Result<Self, regex::Error> {
        let any = RegexSet::new(RULES.iter().map(|(p, _)| *p))?;
        let each = RULES
            .iter()
            .map(|&(p, r)| Regex::new(p).map(|re| (re, r)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { any, each })
    }
}

static REDACTIONS: OnceLock<Option<Redactions>> = OnceLock::new();

fn redactions() -> Option<&'static Redactions> {
    REDACTIONS
        .get_or_init(|| Redactions::compile().ok())
        .as_ref()
}

fn max_bytes() -> usize {
    std::env::var("AEROLUNG_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_MAX_BYTES)
}

/// Longest prefix of `input` within `limit` bytes, on a char boundary.
fn clip(input: &str, limit: usize) -> (&str, bool) {
    if input.len() <= limit {
        return (input, false);
    }
    let mut end = limit;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact patient data from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_within(input, max_bytes())
}

fn sanitize_within(input: &str, limit: usize) -> String {
    let (text, clipped) = clip(input, limit);

    let mut out = match redactions() {
        None => UNSANITIZED_LINE.to_string(),
        Some(r) => {
            let hits = r.any.matches(text);
            let mut out = text.to_string();
            for idx in hits.iter() {
                let (re, replacement) = &r.each[idx];
                out = re.replace_all(&out, *replacement).into_owned();
            }
            out
        }
    };

    if clipped {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// `MakeWriter` that sanitizes each formatted line before passing it on.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffered writer; complete lines are sanitized as they arrive.
pub struct SanitizingWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> SanitizingWriter<W> {
    fn emit(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let clean = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(clean.as_bytes())
    }

    fn drain_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line)?;
        }
        Ok(())
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);

        // A runaway line without newlines is flushed early and marked.
        if self.pending.len() > max_bytes().saturating_mul(2) {
            let chunk = std::mem::take(&mut self.pending);
            self.emit(&chunk)?;
            self.inner.write_all(b"\n[TRUNCATED]\n")?;
            return Ok(buf.len());
        }

        self.drain_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.drain_lines()?;
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            pending: Vec::new(),
        }
    }
}
