/// The signed-in user submitting an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub profile_id: String,
    /// Every group id the user may sign with, profile id included.
    pub group_ids: Vec<String>,
}

impl Identity {
    pub fn new(profile_id: impl Into<String>) -> Self {
        let profile_id = profile_id.into();
        Self {
            group_ids: vec![profile_id.clone()],
            profile_id,
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for group in groups {
            let group = group.into();
            if !self.group_ids.contains(&group) {
                self.group_ids.push(group);
            }
        }
        self
    }
}
