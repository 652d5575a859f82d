//! Raw spec parsing into model-ready feature columns.
//!
//! The transform is a fixed sequence of parsing steps over the raw table;
//! each step either succeeds for every row or aborts the whole transform.
//! There is no partial-row skip and no silent NaN: a spec string that
//! violates its expected format is a hard error.

use crate::error::{PricerError, Result};
use crate::frame::DataFrame;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn resolution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{3,4})x(\d{3,4})").expect("valid resolution pattern"))
}

fn ssd_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+\.?\d*)\s*TB\s*SSD|(\d+\.?\d*)\s*GB\s*SSD").expect("valid SSD pattern")
    })
}

fn hdd_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+\.?\d*)\s*TB\s*HDD|(\d+\.?\d*)\s*GB\s*HDD").expect("valid HDD pattern")
    })
}

/// Storage technologies extracted from the `Memory` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Ssd,
    Hdd,
}

impl StorageKind {
    fn pattern(self) -> &'static Regex {
        match self {
            StorageKind::Ssd => ssd_re(),
            StorageKind::Hdd => hdd_re(),
        }
    }
}

/// Parses raw hardware spec columns into numeric features.
///
/// A pure function of its input: no state is learned, so the same instance
/// serves training and inference. It is still carried inside the saved
/// estimator bundle so that the drop list used at training time can never
/// drift from the one used at inference time.
///
/// Input columns consumed: `ScreenResolution`, `Cpu`, `Memory`, `Gpu`,
/// `Inches`, plus in-place rewrites of `Weight`, `Ram` and `OpSys`.
/// Output columns added: `ppi`, `is_ips`, `is_touchscreen`, `Cpu_name`,
/// `CPU_Speed_GHz`, `SSD_GB`, `HDD_GB`, `gpu_brand`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecFeaturizer {
    drop_columns: Vec<String>,
}

impl SpecFeaturizer {
    /// Create a featurizer with the schema's drop-column list.
    pub fn new(drop_columns: Vec<String>) -> Self {
        Self { drop_columns }
    }

    /// The configured drop list.
    pub fn drop_columns(&self) -> &[String] {
        &self.drop_columns
    }

    /// Run the full transform. Deterministic; the output column set is
    /// identical for every input that parses.
    ///
    /// # Errors
    /// [`PricerError::ParseFormat`] on the first field that violates its
    /// expected pattern; [`PricerError::MissingColumn`] if a consumed
    /// column is absent.
    pub fn transform(&self, input: &DataFrame) -> Result<DataFrame> {
        if input.n_rows() == 0 {
            return Err(PricerError::EmptyData(
                "cannot featurize an empty frame".to_string(),
            ));
        }

        let mut df = input.clone();
        df.drop_columns(&self.drop_columns);
        debug!("dropped columns: {:?}", self.drop_columns);

        // Weight: "<float>kg" -> f64, strict suffix.
        let weight: Vec<f64> = df
            .strs("Weight")?
            .iter()
            .map(|s| parse_weight(s))
            .collect::<Result<_>>()?;
        df.set_num("Weight", weight)?;

        // Ram: "<int>GB" -> f64.
        let ram: Vec<f64> = df
            .strs("Ram")?
            .iter()
            .map(|s| parse_ram(s))
            .collect::<Result<_>>()?;
        df.set_num("Ram", ram)?;

        // ScreenResolution -> ppi + panel flags, consuming Inches.
        let inches = df.num("Inches")?.to_vec();
        let screens = df.strs("ScreenResolution")?;
        let mut ppi = Vec::with_capacity(screens.len());
        let mut is_ips = Vec::with_capacity(screens.len());
        let mut is_touch = Vec::with_capacity(screens.len());
        for (s, &diag) in screens.iter().zip(inches.iter()) {
            let (res_x, res_y) = parse_resolution(s)?;
            ppi.push(((res_x * res_x + res_y * res_y) as f64).sqrt() / diag);
            let lower = s.to_lowercase();
            is_ips.push(if lower.contains("ips") { 1.0 } else { 0.0 });
            is_touch.push(if lower.contains("touchscreen") { 1.0 } else { 0.0 });
        }
        df.set_num("ppi", ppi)?;
        df.set_num("is_ips", is_ips)?;
        df.set_num("is_touchscreen", is_touch)?;
        df.take_column("Inches");

        // Cpu -> vendor/family class + clock speed.
        let cpus = df.strs("Cpu")?;
        let mut cpu_name = Vec::with_capacity(cpus.len());
        let mut cpu_speed = Vec::with_capacity(cpus.len());
        for s in cpus {
            cpu_name.push(classify_cpu(s).to_string());
            cpu_speed.push(parse_cpu_speed(s)?);
        }
        df.set_str("Cpu_name", cpu_name)?;
        df.set_num("CPU_Speed_GHz", cpu_speed)?;
        df.take_column("ScreenResolution");
        df.take_column("Cpu");

        // Memory -> SSD/HDD totals in GB. Repeated occurrences of a type
        // are summed, never overwritten.
        let memories = df.strs("Memory")?;
        let ssd: Vec<f64> = memories
            .iter()
            .map(|m| extract_storage(m, StorageKind::Ssd))
            .collect();
        let hdd: Vec<f64> = memories
            .iter()
            .map(|m| extract_storage(m, StorageKind::Hdd))
            .collect();
        df.set_num("SSD_GB", ssd)?;
        df.set_num("HDD_GB", hdd)?;
        df.take_column("Memory");

        // Gpu -> brand token.
        let brands: Vec<String> = df
            .strs("Gpu")?
            .iter()
            .map(|g| gpu_brand(g).to_string())
            .collect();
        df.set_str("gpu_brand", brands)?;
        df.take_column("Gpu");

        // OpSys -> one of {windows, linux, mac, other}.
        let os: Vec<String> = df
            .strs("OpSys")?
            .iter()
            .map(|s| normalize_os(s).to_string())
            .collect();
        df.set_str("OpSys", os)?;

        Ok(df)
    }
}

/// Parse a weight of the strict form `"<float>kg"`.
pub fn parse_weight(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let stripped = trimmed
        .strip_suffix("kg")
        .ok_or_else(|| PricerError::ParseFormat {
            column: "Weight".to_string(),
            value: s.to_string(),
            reason: "missing 'kg' suffix".to_string(),
        })?;
    stripped
        .trim()
        .parse::<f64>()
        .map_err(|_| PricerError::ParseFormat {
            column: "Weight".to_string(),
            value: s.to_string(),
            reason: "not a number before 'kg'".to_string(),
        })
}

/// Parse a RAM size of the strict form `"<int>GB"`.
pub fn parse_ram(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let stripped = trimmed
        .strip_suffix("GB")
        .ok_or_else(|| PricerError::ParseFormat {
            column: "Ram".to_string(),
            value: s.to_string(),
            reason: "missing 'GB' suffix".to_string(),
        })?;
    stripped
        .trim()
        .parse::<u32>()
        .map(f64::from)
        .map_err(|_| PricerError::ParseFormat {
            column: "Ram".to_string(),
            value: s.to_string(),
            reason: "not an integer before 'GB'".to_string(),
        })
}

/// Extract `(res_x, res_y)` from the first `WxH` occurrence in a
/// resolution string. Multi-mode displays list several resolutions; only
/// the first counts.
pub fn parse_resolution(s: &str) -> Result<(u32, u32)> {
    let caps = resolution_re()
        .captures(s)
        .ok_or_else(|| PricerError::ParseFormat {
            column: "ScreenResolution".to_string(),
            value: s.to_string(),
            reason: "no WxH resolution found".to_string(),
        })?;
    let res_x = caps[1].parse::<u32>().map_err(|_| PricerError::ParseFormat {
        column: "ScreenResolution".to_string(),
        value: s.to_string(),
        reason: "horizontal resolution out of range".to_string(),
    })?;
    let res_y = caps[2].parse::<u32>().map_err(|_| PricerError::ParseFormat {
        column: "ScreenResolution".to_string(),
        value: s.to_string(),
        reason: "vertical resolution out of range".to_string(),
    })?;
    Ok((res_x, res_y))
}

/// Classify a CPU description into one of five fixed categories.
///
/// The first three whitespace tokens form the brand+family string. Exact
/// `Intel Core i5/i7/i3` pass through; any other Intel part becomes
/// `other intel`; everything else is folded into `amd`. The two-vendor
/// assumption is a known limitation of the source data, preserved as-is.
pub fn classify_cpu(s: &str) -> &'static str {
    let tokens: Vec<&str> = s.split_whitespace().take(3).collect();
    let name = tokens.join(" ");
    match name.as_str() {
        "Intel Core i5" => "Intel Core i5",
        "Intel Core i7" => "Intel Core i7",
        "Intel Core i3" => "Intel Core i3",
        _ => {
            if tokens.first() == Some(&"Intel") {
                "other intel"
            } else {
                "amd"
            }
        }
    }
}

/// Clock speed: last whitespace token with a trailing `GHz` stripped.
pub fn parse_cpu_speed(s: &str) -> Result<f64> {
    let last = s
        .split_whitespace()
        .last()
        .ok_or_else(|| PricerError::ParseFormat {
            column: "Cpu".to_string(),
            value: s.to_string(),
            reason: "empty CPU description".to_string(),
        })?;
    let numeric = last.strip_suffix("GHz").unwrap_or(last);
    numeric.parse::<f64>().map_err(|_| PricerError::ParseFormat {
        column: "Cpu".to_string(),
        value: s.to_string(),
        reason: "no numeric clock speed in last token".to_string(),
    })
}

/// Total capacity in GB for one storage technology, summing every
/// occurrence anywhere in the string (TB counted as 1024 GB).
///
/// A missing storage type yields 0.0; mixed-storage laptops report each
/// type independently.
pub fn extract_storage(memory: &str, kind: StorageKind) -> f64 {
    let upper = memory.to_uppercase();
    let mut total = 0.0;
    for caps in kind.pattern().captures_iter(&upper) {
        if let Some(tb) = caps.get(1) {
            if let Ok(v) = tb.as_str().parse::<f64>() {
                total += v * 1024.0;
            }
        } else if let Some(gb) = caps.get(2) {
            if let Ok(v) = gb.as_str().parse::<f64>() {
                total += v;
            }
        }
    }
    total
}

/// GPU brand: the first whitespace token of the GPU description.
pub fn gpu_brand(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Normalize an operating-system string into one of
/// `{windows, linux, mac, other}`.
///
/// Containment checks run in precedence order; a string mentioning both
/// windows and linux classifies as windows.
pub fn normalize_os(s: &str) -> &'static str {
    let lower = s.to_lowercase();
    if lower.contains("windows") {
        "windows"
    } else if lower.contains("linux") {
        "linux"
    } else if lower.contains("mac") {
        "mac"
    } else {
        "other"
    }
}
