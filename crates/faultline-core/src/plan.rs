//! Behavior interpreter: raw query parameters -> validated execution plan.
//!
//! Only `dep` is parsed strictly. `sleep` and `code` are lenient: anything
//! that does not parse (or is out of range) is treated as absent.

use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::{FaultlineError, Result};
use crate::identity;

/// Lowest status code a caller may inject.
pub const MIN_INJECTED_STATUS: u16 = 200;
/// Highest representable HTTP status code.
pub const MAX_INJECTED_STATUS: u16 = 999;

/// Standard padded alphabet; non-zero trailing bits are tolerated.
const DEP_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Raw request parameters as they arrived on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    pub name: Option<String>,
    /// Still base64-encoded.
    pub dep: Option<String>,
    pub sleep: Option<String>,
    pub code: Option<String>,
}

impl RequestParameters {
    /// Collect parameters from decoded query pairs. The first occurrence of a
    /// key wins; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut out = Self::default();
        for (k, v) in pairs {
            let slot = match k.as_ref() {
                "name" => &mut out.name,
                "dep" => &mut out.dep,
                "sleep" => &mut out.sleep,
                "code" => &mut out.code,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(v.into());
            }
        }
        out
    }
}

/// Validated, defaulted form of [`RequestParameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Always non-empty.
    pub name: String,
    /// Decoded dependency path; empty means "no dependency".
    pub dependency_path: String,
    /// Requested delay in milliseconds, `None` when absent or unparsable.
    pub sleep_millis: Option<u64>,
    /// Status to inject, `None` means the default 200.
    pub status_code: Option<u16>,
}

impl ExecutionPlan {
    /// Interpret raw parameters, resolving the name with the default RNG.
    pub fn interpret(params: &RequestParameters) -> Result<Self> {
        let dependency_path = decode_dependency(params.dep.as_deref())?;
        Ok(Self {
            name: identity::resolve_name(params.name.as_deref()),
            dependency_path,
            sleep_millis: parse_sleep(params.sleep.as_deref()),
            status_code: parse_status(params.code.as_deref()),
        })
    }

    pub fn has_dependency(&self) -> bool {
        !self.dependency_path.is_empty()
    }

    /// Sleep reported in the summary (absent reads as 0).
    pub fn slept_millis(&self) -> u64 {
        self.sleep_millis.unwrap_or(0)
    }
}

/// Strict base64 decoding of the `dep` value.
pub fn decode_dependency(raw: Option<&str>) -> Result<String> {
    let Some(raw) = raw else {
        return Ok(String::new());
    };
    // line breaks inside the value are ignored
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let bytes = DEP_ENGINE
        .decode(cleaned)
        .map_err(|e| FaultlineError::InvalidEncoding(format!("dep: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| FaultlineError::InvalidEncoding("dep: decoded path is not utf-8".into()))
}

/// Lenient sleep parsing: non-negative integers only.
pub fn parse_sleep(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok()
}

/// Lenient status parsing: integers within 200..=999 only.
pub fn parse_status(raw: Option<&str>) -> Option<u16> {
    let code = raw?.trim().parse::<i64>().ok()?;
    if (i64::from(MIN_INJECTED_STATUS)..=i64::from(MAX_INJECTED_STATUS)).contains(&code) {
        u16::try_from(code).ok()
    } else {
        None
    }
}
