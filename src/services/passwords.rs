use crate::database::models::accounts::PasswordHolder;
use crate::errors::AppError;

pub const ACCOUNT_NOT_FOUND: &str = "Account doesn't exist";
pub const WRONG_PASSWORD: &str = "Wrong password";

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

pub fn ensure_passwords_match(password: &str, confirm_password: &str) -> Result<(), AppError> {
    if password == confirm_password {
        Ok(())
    } else {
        Err(AppError::InvalidInput("Passwords do not match".to_string()))
    }
}

/// Picks the candidate whose hash matches `password`.
///
/// Several rows may share a username, so every candidate is tried in order.
/// No candidates at all means the identifier is unknown.
pub fn match_candidate<M: PasswordHolder>(candidates: Vec<M>, password: &str) -> Result<M, AppError> {
    if candidates.is_empty() {
        return Err(AppError::NotFound(ACCOUNT_NOT_FOUND.to_string()));
    }

    candidates
        .into_iter()
        .find(|candidate| verify_password(password, candidate.password_hash()))
        .ok_or_else(|| AppError::Unauthorized(WRONG_PASSWORD.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        label: &'static str,
        hash: String,
    }

    impl PasswordHolder for Row {
        fn password_hash(&self) -> &str {
            &self.hash
        }
    }

    fn row(label: &'static str, password: &str) -> Row {
        Row {
            label,
            hash: hash_password(password, 4).unwrap(),
        }
    }

    #[test]
    fn empty_candidates_mean_unknown_account() {
        let err = match_candidate(Vec::<Row>::new(), "whatever").err().unwrap();
        assert!(matches!(err, AppError::NotFound(ref m) if m == ACCOUNT_NOT_FOUND));
    }

    #[test]
    fn wrong_password_is_distinct_from_unknown() {
        let err = match_candidate(vec![row("a", "correct-horse")], "battery-staple")
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == WRONG_PASSWORD));
    }

    #[test]
    fn picks_the_duplicate_whose_password_matches() {
        let candidates = vec![row("first", "password-one"), row("second", "password-two")];
        let found = match_candidate(candidates, "password-two").unwrap();
        assert_eq!(found.label, "second");
    }

    #[test]
    fn corrupt_hash_never_matches() {
        let candidates = vec![Row {
            label: "broken",
            hash: "not-a-bcrypt-hash".to_string(),
        }];
        assert!(match_candidate(candidates, "anything").is_err());
    }

    #[test]
    fn confirmation_must_equal_password() {
        assert!(ensure_passwords_match("abcdefgh", "abcdefgh").is_ok());
        assert!(matches!(
            ensure_passwords_match("abcdefgh", "abcdefgi"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
