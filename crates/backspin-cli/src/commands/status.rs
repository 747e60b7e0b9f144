use anyhow::Result;
use backspin_core::model::ReviewStatus;
use serde_json::json;

use super::Session;

pub fn show_status(session: &Session, db_path: &std::path::Path) -> Result<()> {
    let store = session.db.store();
    let users = store.list_users()?.len();
    let albums = store.list_albums(None)?.len();
    let pending = store.count_reviews(ReviewStatus::Pending)?;
    let approved = store.count_reviews(ReviewStatus::Approved)?;
    let rejected = store.count_reviews(ReviewStatus::Rejected)?;

    let value = json!({
        "database": db_path,
        "users": users,
        "albums": albums,
        "reviews": {
            "pending": pending,
            "approved": approved,
            "rejected": rejected,
        },
    });
    session.emit(&value, |_| {
        println!("\nBackspin Status\n");
        println!("  Database: {}", db_path.display());
        println!("  Users: {}", users);
        println!("  Albums: {}", albums);
        println!("  Reviews: {} approved, {} rejected, {} pending", approved, rejected, pending);

        if pending > 0 {
            println!("\n  Run `backspin review pending` to moderate them");
        }
    })
}
