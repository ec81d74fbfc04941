pub mod test_rooms_do_not_mix;
pub mod test_three_member_mesh;
