use huddle_core::{ConnectionId, MemberId};

/// One member of a room, bound to the connection it joined from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub member_id: MemberId,
    pub connection_id: ConnectionId,
}

impl RoomMember {
    pub fn new(member_id: MemberId, connection_id: ConnectionId) -> Self {
        Self {
            member_id,
            connection_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Members present before the join, in join order.
    pub previous: Vec<RoomMember>,
    /// Stale binding of the same member id to another connection, dropped by this join.
    pub evicted: Option<RoomMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub removed: Option<RoomMember>,
    pub remaining: Vec<RoomMember>,
    pub room_empty: bool,
}

/// Member set of a single room. Only reachable through the registry's per-room lock.
#[derive(Debug, Default)]
pub(crate) struct RoomEntry {
    members: Vec<RoomMember>,
    /// Set once the room emptied and was released from the registry.
    pub(crate) closed: bool,
}

impl RoomEntry {
    pub(crate) fn admit(&mut self, member: RoomMember) -> JoinOutcome {
        let evicted = self
            .members
            .iter()
            .position(|m| m.member_id == member.member_id)
            .map(|idx| self.members.remove(idx));

        let previous = self.members.clone();
        self.members.push(member);

        JoinOutcome { previous, evicted }
    }

    pub(crate) fn release(&mut self, member: &RoomMember) -> LeaveOutcome {
        let removed = self
            .members
            .iter()
            .position(|m| m == member)
            .map(|idx| self.members.remove(idx));

        LeaveOutcome {
            removed,
            remaining: self.members.clone(),
            room_empty: self.members.is_empty(),
        }
    }

    pub(crate) fn members(&self) -> &[RoomMember] {
        &self.members
    }
}
