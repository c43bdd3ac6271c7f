pub(crate) mod students;
pub(crate) mod teachers;
pub(crate) mod users;
