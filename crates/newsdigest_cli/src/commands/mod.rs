pub(crate) mod crawl;
pub(crate) mod fetch;
pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod prune;
pub(crate) mod recent;
pub(crate) mod run;
pub(crate) mod telegram;
