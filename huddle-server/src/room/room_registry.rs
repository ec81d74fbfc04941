use crate::room::room_entry::{JoinOutcome, LeaveOutcome, RoomEntry, RoomMember};
use dashmap::DashMap;
use huddle_core::{ConnectionId, MemberId, RoomId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Room id -> member set. Every read or write of one room runs under that room's lock,
/// so unrelated rooms never contend.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Arc<Mutex<RoomEntry>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(&self, room_id: &RoomId, member: RoomMember) -> JoinOutcome {
        self.join_with(room_id, member, |_, _| {}).await
    }

    /// Adds `member` and runs `commit` before the room lock is released, so the
    /// notices it sends agree with the snapshot handed back to the joiner.
    pub async fn join_with<F>(&self, room_id: &RoomId, member: RoomMember, commit: F) -> JoinOutcome
    where
        F: FnOnce(&RoomMember, &JoinOutcome),
    {
        loop {
            let entry = self.entry(room_id);
            let mut room = entry.lock().await;

            // Emptied and released while we waited on the lock; retry on a fresh entry.
            if room.closed {
                continue;
            }

            let outcome = room.admit(member.clone());
            commit(&member, &outcome);
            return outcome;
        }
    }

    pub async fn leave(&self, room_id: &RoomId, member: &RoomMember) -> LeaveOutcome {
        self.leave_with(room_id, member, |_| {}).await
    }

    /// Removes `member` (only if still bound to the same connection) and runs `commit`
    /// under the room lock. An emptied room is released.
    pub async fn leave_with<F>(
        &self,
        room_id: &RoomId,
        member: &RoomMember,
        commit: F,
    ) -> LeaveOutcome
    where
        F: FnOnce(&LeaveOutcome),
    {
        let Some(entry) = self.rooms.get(room_id).map(|e| e.value().clone()) else {
            return LeaveOutcome {
                room_empty: true,
                ..Default::default()
            };
        };

        let mut room = entry.lock().await;
        if room.closed {
            return LeaveOutcome {
                room_empty: true,
                ..Default::default()
            };
        }

        let outcome = room.release(member);
        commit(&outcome);

        if outcome.room_empty {
            room.closed = true;
            self.rooms
                .remove_if(room_id, |_, current| Arc::ptr_eq(current, &entry));
            info!("Room {} is empty, released", room_id);
        }

        outcome
    }

    /// Runs `f` over the member list while holding the room lock.
    pub async fn with_members<R, F>(&self, room_id: &RoomId, f: F) -> Option<R>
    where
        F: FnOnce(&[RoomMember]) -> R,
    {
        let entry = self.rooms.get(room_id).map(|e| e.value().clone())?;
        let room = entry.lock().await;
        if room.closed {
            return None;
        }
        Some(f(room.members()))
    }

    pub async fn lookup(&self, room_id: &RoomId, member_id: &MemberId) -> Option<ConnectionId> {
        self.with_members(room_id, |members| {
            members
                .iter()
                .find(|m| &m.member_id == member_id)
                .map(|m| m.connection_id)
        })
        .await
        .flatten()
    }

    pub async fn members(&self, room_id: &RoomId) -> Vec<RoomMember> {
        self.with_members(room_id, |members| members.to_vec())
            .await
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    fn entry(&self, room_id: &RoomId) -> Arc<Mutex<RoomEntry>> {
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating new room: {}", room_id);
                Arc::new(Mutex::new(RoomEntry::default()))
            })
            .clone()
    }
}
