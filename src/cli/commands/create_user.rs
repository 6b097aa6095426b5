//! Create user command handler

use crate::api::validation::{Registration, validate_registration};
use crate::config::Config;
use crate::db::Store;
use crate::models::user::{NewUser, Role};

pub struct CreateUserArgs {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub admin: bool,
}

pub async fn cmd_create_user(config: &Config, args: CreateUserArgs) -> anyhow::Result<()> {
    validate_registration(&Registration {
        name: &args.name,
        username: &args.username,
        password: &args.password,
        confirm_password: &args.password,
        email: &args.email,
    })
    .map_err(|e| anyhow::anyhow!(e.status_and_message().1))?;

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let mut input = NewUser::standard(args.name, args.username, args.password, args.email);
    if args.admin {
        input.role = Role::Admin;
    }

    let user = store.create_user(input, &config.security).await?;

    println!("Created user {} ({})", user.username, user.id);
    if args.admin {
        println!("Role: admin");
    }

    Ok(())
}
