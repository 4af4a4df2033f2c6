use anyhow::{bail, Context, Result};
use isogrid_core::config::KEY_COUNT;
use isogrid_core::KeyBitmap;

/// Raw key state observed from a given millisecond on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSample {
    pub time: u32,
    pub raw: KeyBitmap,
}

/// Parse a raw-state trace.
///
/// One sample per line: `<time_ms> <bitmap>`, bitmap in hex with an
/// optional `0x` prefix, bit N set when key N is pressed. `#` starts a
/// comment. Times must not decrease.
pub fn parse_trace(input: &str) -> Result<Vec<TraceSample>> {
    let mut samples: Vec<TraceSample> = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((content, _)) => content,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(time), Some(bitmap), None) = (fields.next(), fields.next(), fields.next()) else {
            bail!("line {}: expected `<time_ms> <bitmap>`", line_num + 1);
        };

        let time: u32 = time
            .parse()
            .with_context(|| format!("line {}: invalid time {:?}", line_num + 1, time))?;
        let raw = parse_bitmap(bitmap)
            .with_context(|| format!("line {}: invalid bitmap {:?}", line_num + 1, bitmap))?;

        if let Some(last) = samples.last() {
            if time < last.time {
                bail!(
                    "line {}: time {} ms goes backwards (previous sample at {} ms)",
                    line_num + 1,
                    time,
                    last.time
                );
            }
        }

        samples.push(TraceSample { time, raw });
    }

    Ok(samples)
}

fn parse_bitmap(text: &str) -> Result<KeyBitmap> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bits = u64::from_str_radix(digits, 16).context("not a hex number")?;
    if KEY_COUNT < 64 && bits >> KEY_COUNT != 0 {
        bail!("bits set beyond key {}", KEY_COUNT - 1);
    }
    Ok(KeyBitmap::from_bits(bits))
}
