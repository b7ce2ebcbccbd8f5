//! Build-system capability tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A build-orchestration driver a package supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildCapability {
    /// CMake-driven configure/build/install
    #[serde(rename = "cmake-build")]
    CMake,
    /// Optional GPU-toolkit compilation
    #[serde(rename = "cuda-build")]
    Cuda,
}

impl BuildCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildCapability::CMake => "cmake-build",
            BuildCapability::Cuda => "cuda-build",
        }
    }
}

impl fmt::Display for BuildCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildCapability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cmake-build" | "cmake" => Ok(BuildCapability::CMake),
            "cuda-build" | "cuda" => Ok(BuildCapability::Cuda),
            _ => anyhow::bail!(
                "Unknown build capability: {}. Expected cmake-build or cuda-build.",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_parse() {
        assert_eq!("cmake-build".parse::<BuildCapability>().unwrap(), BuildCapability::CMake);
        assert_eq!("CUDA".parse::<BuildCapability>().unwrap(), BuildCapability::Cuda);
        assert!("autotools".parse::<BuildCapability>().is_err());
    }

    #[test]
    fn test_capability_serde_names() {
        let json = serde_json::to_string(&BuildCapability::CMake).unwrap();
        assert_eq!(json, r#""cmake-build""#);
        let back: BuildCapability = serde_json::from_str(r#""cuda-build""#).unwrap();
        assert_eq!(back, BuildCapability::Cuda);
    }
}
