//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_display_contains_version() {
        let info = VersionInfo::current();
        let display = info.to_string();
        assert!(display.starts_with(&format!("crr {}", info.version)));
        assert!(display.contains("Assembly:   1.0.0"));
        assert!(display.contains("Templates:  2010-09-09"));
    }

    #[test]
    fn test_version_info_json_serialization() {
        let info = VersionInfo::current();
        let json = serde_json::to_value(&info).expect("should serialize to JSON");
        assert_eq!(json["assembly_version"], "1.0.0");
        assert_eq!(json["template_format_version"], "2010-09-09");
    }
}
