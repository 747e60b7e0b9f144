use anyhow::Result;
use backspin_engine::Catalog;

use super::Session;

/// Register a user. Registering an admin needs `--as` naming an admin,
/// unless the site has none yet.
pub fn add_user(session: &Session, handle: &str, admin: bool) -> Result<()> {
    let catalog = Catalog::new(&session.db);
    let user = if admin {
        catalog.register_admin(session.optional_actor()?, handle)?
    } else {
        catalog.register_user(handle)?
    };
    session.emit(&user, |user| {
        println!("✓ Registered {} ({})", user.handle, user.id);
        if user.is_admin {
            println!("  with admin rights");
        }
    })
}

pub fn list_users(session: &Session) -> Result<()> {
    let users = Catalog::new(&session.db).list_users()?;
    session.emit(&users, |users| {
        for user in users {
            let role = if user.is_admin { "admin" } else { "user" };
            println!("{:<20} {:<6} {}", user.handle, role, user.id);
        }
    })
}
