mod multiset;

pub use multiset::multiset_equal;
