//! Directory Store
//!
//! Durable CRUD over the member collection. Every operation reloads the
//! persisted document, and every mutation runs load → mutate → persist under
//! one store-wide lock so concurrent admin edits cannot lose each other's
//! writes. A failed validation or persist leaves the document untouched.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, Timelike};
use parking_lot::Mutex;
use shared::models::{Member, MemberCreate, MemberUpdate};

use super::error::{DirectoryError, DirectoryResult};
use super::persistence::{JsonFilePersistence, Persistence};
use super::search::filter_members;
use super::validation::prepare_member;
use crate::photos::stored_file_name;

/// Result of a successful delete
#[derive(Debug, Clone)]
pub struct DeletedMember {
    pub member: Member,
    /// Photo reference no remaining member points at; the photo store may reclaim it
    pub orphaned_photo: Option<String>,
}

/// Member collection over a pluggable [`Persistence`] backend
pub struct DirectoryStore {
    persistence: Box<dyn Persistence>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for DirectoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryStore")
            .field("location", &self.persistence.location())
            .finish()
    }
}

impl DirectoryStore {
    pub fn new(persistence: impl Persistence + 'static) -> Self {
        Self {
            persistence: Box::new(persistence),
            lock: Mutex::new(()),
        }
    }

    /// Store backed by a JSON file
    pub fn open_json(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFilePersistence::new(path))
    }

    /// Full collection in persisted (insertion) order
    pub fn load(&self) -> DirectoryResult<Vec<Member>> {
        let _guard = self.lock.lock();
        self.load_locked()
    }

    pub fn count(&self) -> DirectoryResult<usize> {
        Ok(self.load()?.len())
    }

    pub fn get(&self, id: i64) -> DirectoryResult<Member> {
        self.load()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or(DirectoryError::NotFound(id))
    }

    /// See [`filter_members`] for the threshold semantics
    pub fn search(&self, query: &str, minimum_length: usize) -> DirectoryResult<Vec<Member>> {
        let members = self.load()?;
        Ok(filter_members(&members, query, minimum_length))
    }

    pub fn add(&self, candidate: MemberCreate) -> DirectoryResult<Member> {
        let draft = Member {
            id: 0,
            name: candidate.name,
            phone: candidate.phone,
            email: candidate.email,
            address: candidate.address,
            birthday: candidate.birthday,
            photo: candidate.photo,
            joined: None,
        };
        let mut member = prepare_member(draft)?;

        let created = self.mutate(|members| {
            let taken: HashSet<i64> = members.iter().map(|m| m.id).collect();
            member.id = fresh_id(&taken);
            member.joined = Some(joined_now());
            members.push(member.clone());
            Ok(member)
        })?;

        tracing::info!(member_id = created.id, name = %created.name, "Member added");
        Ok(created)
    }

    /// Apply `patch` to member `id`; `id` and `joined` never change
    pub fn update(&self, id: i64, patch: MemberUpdate) -> DirectoryResult<Member> {
        let updated = self.mutate(|members| {
            let slot = members
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or(DirectoryError::NotFound(id))?;

            let current = slot.clone();
            let draft = Member {
                id: current.id,
                name: patch.name.unwrap_or(current.name),
                phone: patch.phone.unwrap_or(current.phone),
                email: patch.email.or(current.email),
                address: patch.address.or(current.address),
                birthday: patch.birthday.unwrap_or(current.birthday),
                photo: patch.photo.or(current.photo),
                joined: current.joined,
            };
            let member = prepare_member(draft)?;
            *slot = member.clone();
            Ok(member)
        })?;

        tracing::info!(member_id = id, "Member updated");
        Ok(updated)
    }

    /// Remove member `id`; deleting an unknown id is an error, not a no-op
    pub fn delete(&self, id: i64) -> DirectoryResult<DeletedMember> {
        let deleted = self.mutate(|members| {
            let idx = members
                .iter()
                .position(|m| m.id == id)
                .ok_or(DirectoryError::NotFound(id))?;
            let member = members.remove(idx);

            // Uploads are deduplicated by content, so another member may share the file
            let orphaned_photo = member
                .photo
                .clone()
                .filter(|photo| !members.iter().any(|m| m.photo.as_ref() == Some(photo)));

            Ok(DeletedMember {
                member,
                orphaned_photo,
            })
        })?;

        tracing::info!(
            member_id = id,
            orphaned_photo = ?deleted.orphaned_photo,
            "Member deleted"
        );
        Ok(deleted)
    }

    /// Caller must hold `self.lock`
    fn load_locked(&self) -> DirectoryResult<Vec<Member>> {
        let mut members = self.persistence.load()?;
        let ids_assigned = assign_missing_ids(&mut members);
        let photos_renamed = normalize_photo_references(&mut members);
        if ids_assigned || photos_renamed {
            // Legacy records: make the fixes durable before anyone can reference them
            self.persistence.persist(&members)?;
            tracing::info!(
                location = %self.persistence.location(),
                ids_assigned,
                photos_renamed,
                "Migrated legacy records"
            );
        }
        Ok(members)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Vec<Member>) -> DirectoryResult<T>,
    ) -> DirectoryResult<T> {
        let _guard = self.lock.lock();
        let mut members = self.load_locked()?;
        let out = op(&mut members)?;
        self.persistence.persist(&members)?;
        Ok(out)
    }
}

/// Give every record with a missing (0) or duplicate id a fresh one.
/// Returns whether anything changed.
fn assign_missing_ids(members: &mut [Member]) -> bool {
    let mut taken: HashSet<i64> = HashSet::with_capacity(members.len());
    let mut needs_id = Vec::new();
    for (idx, m) in members.iter().enumerate() {
        if m.id == 0 || !taken.insert(m.id) {
            needs_id.push(idx);
        }
    }

    for &idx in &needs_id {
        let id = fresh_id(&taken);
        taken.insert(id);
        members[idx].id = id;
    }
    !needs_id.is_empty()
}

/// Rewrite `photos/<name>` references to the bare file name the photo store
/// keeps. References that cannot be resolved safely are left as they are.
fn normalize_photo_references(members: &mut [Member]) -> bool {
    let mut changed = false;
    for m in members.iter_mut() {
        let Some(reference) = m.photo.as_deref() else {
            continue;
        };
        if let Some(name) = stored_file_name(reference)
            && name != reference
        {
            m.photo = Some(name.to_string());
            changed = true;
        }
    }
    changed
}

fn fresh_id(taken: &HashSet<i64>) -> i64 {
    loop {
        let id = shared::util::snowflake_id();
        if id != 0 && !taken.contains(&id) {
            return id;
        }
    }
}

/// Minute precision, matching the on-disk format
fn joined_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
