mod categories;
mod constituency;
mod party;

pub use categories::{AgeBand, Education, Sex};
pub use constituency::{ConstCode, Constituency, ConstituencyIndex};
pub use party::Party;
