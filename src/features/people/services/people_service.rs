use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::features::people::models::{Invitation, Person, Profile};
use crate::features::people::services::DirectoryStore;
use crate::shared::constants::{
    MANAGER_KEYWORD, MANAGER_ROLES, SAFETY_KEYWORD, SAFETY_OFFICER_ROLES,
};

/// Result of a directory fetch; `notice` is set when the fetch failed
#[derive(Debug, Default)]
pub struct PeopleListing {
    pub people: Vec<Person>,
    pub notice: Option<String>,
}

/// Service that loads people eligible for safety assignments
pub struct PeopleService {
    store: Arc<dyn DirectoryStore>,
}

impl PeopleService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Load all people with derived role flags.
    ///
    /// A read failure never fails the caller: it yields an empty list and a notice.
    pub async fn list_people(&self) -> PeopleListing {
        let profiles = match self.store.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                error!("Failed to load profiles: {}", e);
                return Self::failed();
            }
        };

        let invitations = match self.store.list_invitations().await {
            Ok(invitations) => invitations,
            Err(e) => {
                error!("Failed to load invitations: {}", e);
                return Self::failed();
            }
        };

        PeopleListing {
            people: classify_people(&profiles, &invitations),
            notice: None,
        }
    }

    fn failed() -> PeopleListing {
        PeopleListing {
            people: Vec::new(),
            notice: Some("Failed to load people for safety assignments".to_string()),
        }
    }
}

fn contains_keyword(value: Option<&str>, keyword: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(keyword))
}

fn role_in(role: Option<&str>, roles: &[&str]) -> bool {
    role.is_some_and(|r| roles.contains(&r.trim().to_lowercase().as_str()))
}

/// Derive manager/officer flags for every profile.
///
/// Invitations are matched to profiles by lower-cased email. When nobody qualifies for a
/// role, everybody is made eligible for it; the two roles fall back independently.
pub fn classify_people(profiles: &[Profile], invitations: &[Invitation]) -> Vec<Person> {
    let mut invited_user_types: HashMap<String, Option<&str>> = HashMap::new();
    let mut invited_roles: HashMap<String, Option<&str>> = HashMap::new();
    for invitation in invitations {
        let email = invitation.email.trim().to_lowercase();
        if email.is_empty() {
            continue;
        }
        invited_user_types.insert(email.clone(), invitation.user_type.as_deref());
        invited_roles.insert(email, invitation.role.as_deref());
    }

    let mut people: Vec<Person> = profiles
        .iter()
        .map(|profile| {
            // Profiles without an email never match an invitation
            let email = profile
                .email
                .as_deref()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty());
            let invited_type = email
                .as_ref()
                .and_then(|e| invited_user_types.get(e).copied().flatten());
            let invited_role = email
                .as_ref()
                .and_then(|e| invited_roles.get(e).copied().flatten());
            let own_type = profile.user_type.as_deref();

            let is_manager = contains_keyword(own_type, MANAGER_KEYWORD)
                || contains_keyword(invited_type, MANAGER_KEYWORD)
                || role_in(invited_role, MANAGER_ROLES);

            let is_safety_officer = contains_keyword(own_type, SAFETY_KEYWORD)
                || contains_keyword(invited_type, SAFETY_KEYWORD)
                || role_in(invited_role, SAFETY_OFFICER_ROLES);

            Person {
                id: profile.id,
                email: profile.email.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                is_manager,
                is_safety_officer,
            }
        })
        .collect();

    if !people.is_empty() && !people.iter().any(|p| p.is_manager) {
        info!(
            "No profile qualifies as manager; all {} people are eligible as safety manager",
            people.len()
        );
        people.iter_mut().for_each(|p| p.is_manager = true);
    }

    if !people.is_empty() && !people.iter().any(|p| p.is_safety_officer) {
        info!(
            "No profile qualifies as safety officer; all {} people are eligible as officers",
            people.len()
        );
        people.iter_mut().for_each(|p| p.is_safety_officer = true);
    }

    people
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{fake_profile, InMemoryDirectory};
    use uuid::Uuid;

    fn invitation(email: &str, user_type: Option<&str>, role: Option<&str>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_type: user_type.map(String::from),
            role: role.map(String::from),
        }
    }

    #[test]
    fn test_manager_from_own_user_type() {
        let mut boss = fake_profile();
        boss.user_type = Some("Site Manager".to_string());
        let worker = fake_profile();

        let people = classify_people(&[boss.clone(), worker], &[]);

        assert!(people.iter().find(|p| p.id == boss.id).unwrap().is_manager);
        assert_eq!(people.iter().filter(|p| p.is_manager).count(), 1);
    }

    #[test]
    fn test_roles_from_invitation_matched_by_lowercased_email() {
        let mut officer = fake_profile();
        officer.email = Some("Officer@Example.com".to_string());
        let mut manager = fake_profile();
        manager.email = Some("lead@example.com".to_string());

        let invitations = vec![
            invitation("officer@example.com", None, Some("safety_officer")),
            invitation("LEAD@example.com", None, Some("facility_manager")),
        ];

        let people = classify_people(&[officer.clone(), manager.clone()], &invitations);
        let officer = people.iter().find(|p| p.id == officer.id).unwrap();
        let manager = people.iter().find(|p| p.id == manager.id).unwrap();

        assert!(officer.is_safety_officer);
        assert!(!officer.is_manager);
        assert!(manager.is_manager);
        assert!(!manager.is_safety_officer);
    }

    #[test]
    fn test_invitation_user_type_keyword() {
        let mut profile = fake_profile();
        profile.email = Some("hse@example.com".to_string());
        let other = fake_profile();

        let invitations = vec![invitation("hse@example.com", Some("Health & Safety"), None)];
        let people = classify_people(&[profile.clone(), other], &invitations);

        assert!(people.iter().find(|p| p.id == profile.id).unwrap().is_safety_officer);
        assert_eq!(people.iter().filter(|p| p.is_safety_officer).count(), 1);
    }

    #[test]
    fn test_profile_without_email_ignores_blank_invitation() {
        let mut anonymous = fake_profile();
        anonymous.email = None;
        let mut blank = fake_profile();
        blank.email = Some("  ".to_string());
        let mut manager = fake_profile();
        manager.user_type = Some("Plant Manager".to_string());
        let mut officer = fake_profile();
        officer.user_type = Some("Safety Officer".to_string());

        let invitations = vec![invitation("", Some("Safety Manager"), Some("manager"))];
        let people = classify_people(
            &[anonymous.clone(), blank.clone(), manager, officer],
            &invitations,
        );

        for id in [anonymous.id, blank.id] {
            let person = people.iter().find(|p| p.id == id).unwrap();
            assert!(!person.is_manager);
            assert!(!person.is_safety_officer);
        }
    }

    #[test]
    fn test_fallback_makes_everyone_eligible_independently() {
        let mut officer = fake_profile();
        officer.user_type = Some("safety lead".to_string());
        let profiles = vec![officer, fake_profile(), fake_profile()];

        let people = classify_people(&profiles, &[]);

        // Nobody is a manager, so everybody becomes one
        assert!(people.iter().all(|p| p.is_manager));
        // Officer role was satisfied by one person, so no fallback there
        assert_eq!(people.iter().filter(|p| p.is_safety_officer).count(), 1);
    }

    #[test]
    fn test_fallback_applies_to_both_roles() {
        let people = classify_people(&[fake_profile(), fake_profile()], &[]);
        assert!(people.iter().all(|p| p.is_manager && p.is_safety_officer));
    }

    #[test]
    fn test_empty_directory_stays_empty() {
        assert!(classify_people(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn test_list_people_failure_yields_empty_list_and_notice() {
        let directory = InMemoryDirectory::new(vec![fake_profile()], Vec::new());
        directory.fail_reads(true);
        let service = PeopleService::new(Arc::new(directory));

        let listing = service.list_people().await;

        assert!(listing.people.is_empty());
        assert!(listing.notice.is_some());
    }

    #[tokio::test]
    async fn test_list_people_success() {
        let directory = InMemoryDirectory::new(vec![fake_profile(), fake_profile()], Vec::new());
        let service = PeopleService::new(Arc::new(directory));

        let listing = service.list_people().await;

        assert_eq!(listing.people.len(), 2);
        assert!(listing.notice.is_none());
    }
}
