use std::path::PathBuf;

/// Expand `~`, `$VAR` and `${VAR}` in a user-typed path.
///
/// Unknown variables leave the input untouched.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    PathBuf::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let path = expand_path("~/tree.svg");
        assert_eq!(path, PathBuf::from(home).join("tree.svg"));
    }

    #[test]
    fn given_unknown_variable_when_expanding_then_returns_input() {
        let path = expand_path("$TREEVIZ_SURELY_UNSET_VAR/out.svg");
        assert_eq!(path, PathBuf::from("$TREEVIZ_SURELY_UNSET_VAR/out.svg"));
    }

    #[test]
    fn given_plain_path_when_expanding_then_unchanged() {
        assert_eq!(expand_path("out/tree.svg"), PathBuf::from("out/tree.svg"));
    }
}
