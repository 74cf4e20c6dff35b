/**
 * Define the `RunMode` enum selecting per-environment configuration.
 *
 * - `development` (also aliased as 'dev')
 * - `staging` (also aliased as 'stg')
 * - `production` (also aliased as 'prod'), the fallback for anything else
 */
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Development,
    Staging,
    #[default]
    Production,
}

impl FromStr for RunMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "development" | "dev" => RunMode::Development,
            "staging" | "stg" => RunMode::Staging,
            _ => RunMode::Production,
        })
    }
}

impl RunMode {
    /**
     * Name used in the `applog.{mode}.yaml` file name.
     */
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Staging => "staging",
            RunMode::Production => "production",
        }
    }

    /**
     * Screen level used when nothing is configured: development is verbose,
     * everything else starts at info.
     */
    pub fn default_screen_level(&self) -> &'static str {
        match self {
            RunMode::Development => "debug",
            RunMode::Staging | RunMode::Production => "info",
        }
    }
}

impl<'de> Deserialize<'de> for RunMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(RunMode::from_str(&s).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!("dev".parse::<RunMode>(), Ok(RunMode::Development));
        assert_eq!("Development".parse::<RunMode>(), Ok(RunMode::Development));
        assert_eq!("STG".parse::<RunMode>(), Ok(RunMode::Staging));
        assert_eq!("prod".parse::<RunMode>(), Ok(RunMode::Production));
    }

    #[test]
    fn test_unknown_is_production() {
        assert_eq!("garbage".parse::<RunMode>(), Ok(RunMode::Production));
        assert_eq!("".parse::<RunMode>(), Ok(RunMode::Production));
    }

    #[test]
    fn test_default_screen_level() {
        assert_eq!(RunMode::Development.default_screen_level(), "debug");
        assert_eq!(RunMode::Staging.default_screen_level(), "info");
        assert_eq!(RunMode::Production.default_screen_level(), "info");
    }
}
