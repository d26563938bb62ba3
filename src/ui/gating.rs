/// "This action requires verification" interstitial state
///
/// Transient: lives for the current run only and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictedActionGate {
    open: bool,
    feature: String,
}

impl RestrictedActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, feature: impl Into<String>) {
        self.feature = feature.into();
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
        self.feature.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Feature that triggered the interstitial; empty when closed
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn message(&self) -> Option<String> {
        self.open.then(|| {
            format!(
                "Verification required: complete your account verification before {}.",
                self.feature
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_then_hide() {
        let mut gate = RestrictedActionGate::new();
        assert!(!gate.is_open());
        assert_eq!(gate.message(), None);

        gate.show("creating services");
        assert!(gate.is_open());
        assert_eq!(gate.feature(), "creating services");
        assert!(gate.message().unwrap().contains("creating services"));

        gate.hide();
        assert!(!gate.is_open());
        assert_eq!(gate.feature(), "");
    }

    #[test]
    fn second_show_replaces_feature() {
        let mut gate = RestrictedActionGate::new();
        gate.show("creating services");
        gate.show("posting jobs");
        assert_eq!(gate.feature(), "posting jobs");
    }
}
