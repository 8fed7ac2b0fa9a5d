use sea_orm::DatabaseConnection;
use crate::repositories::user_repository::UserRepository;

pub async fn seed_editor(db: &DatabaseConnection) -> Result<(), String> {
    let username = "editor";
    let email = "editor@kopiblog.dev";

    let exists = UserRepository::find_by_username(db, username)
        .await
        .map_err(|e| e.to_string())?;

    if exists.is_none() {
        println!("🚀 Creating staff editor...");
        UserRepository::create(db, username.to_string(), email.to_string(), true)
            .await
            .map_err(|e| e.to_string())?;
        println!("✅ Editor created! (User: {})", username);
    }

    Ok(())
}
