use nix::unistd::{Uid, User};

use crate::setup::error::SetupError;

/// The user the setup runs on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub uid: u32,
}

impl Identity {
    /// Resolve the invoking user from the real uid and the password database.
    pub fn current() -> Result<Self, SetupError> {
        let uid = Uid::current();
        let name = User::from_uid(uid)
            .ok()
            .flatten()
            .map(|user| user.name)
            .or_else(|| std::env::var("USER").ok())
            .filter(|name| !name.is_empty())
            .ok_or(SetupError::IdentityUnavailable(uid.as_raw()))?;

        Ok(Self {
            name,
            uid: uid.as_raw(),
        })
    }

    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}
