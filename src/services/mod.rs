pub(crate) mod assessment;
