pub(crate) mod mmr;
