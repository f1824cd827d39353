use std::path::Path;

/// Joins relative paths onto `base`; absolute and empty values pass through.
pub fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_base() {
        let base = Path::new("/etc/fraudlens");
        assert_eq!(
            resolve_path(base, "models/fraud_pipeline.json"),
            "/etc/fraudlens/models/fraud_pipeline.json"
        );
        assert_eq!(resolve_path(base, "/var/lib/model.json"), "/var/lib/model.json");
        assert_eq!(resolve_path(base, "  "), "");
    }
}
