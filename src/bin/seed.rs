use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use astrobite_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Mission Control", "admin@astrobite.test", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "Demo Customer", "customer@astrobite.test", "customer123", "customer").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = ["Breakfast", "Mains", "Desserts"];
    for name in categories {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(pool)
            .await?;
    }

    let stores = [
        ("AstroBite Dockside", "D1", "12 Harbour Road"),
        ("AstroBite Observatory", "D3", "48 Summit Lane"),
    ];
    for (name, code, address) in stores {
        sqlx::query(
            r#"
            INSERT INTO stores (id, name, location_code, address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (location_code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(code)
        .bind(address)
        .execute(pool)
        .await?;
    }

    // (category, name, description, price in cents)
    let products = [
        ("Breakfast", "Astro Pancakes", "Freeze-dried buttermilk pancakes, just add water", 899),
        ("Breakfast", "Orbit Oats", "Maple oatmeal with berry clusters", 649),
        ("Mains", "Cosmic Beef Stew", "Slow-cooked stew, vacuum dried for the long haul", 1450),
        ("Mains", "Lunar Mac & Cheese", "Three-cheese classic, zero-gravity approved", 1150),
        ("Desserts", "Neapolitan Slice", "The astronaut ice cream everyone remembers", 550),
        ("Desserts", "Strawberry Clusters", "Whole freeze-dried strawberries in white chocolate", 725),
    ];
    for (category, name, description, price_cents) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price_cents)
            SELECT $1, c.id, $2, $3, $4 FROM categories c WHERE c.name = $5
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price_cents as i64)
        .bind(category)
        .execute(pool)
        .await?;
    }

    // Stock every product at both collection points.
    sqlx::query(
        r#"
        INSERT INTO inventory (product_id, store_id, quantity)
        SELECT p.id, s.id, 25 FROM products p CROSS JOIN stores s
        ON CONFLICT (product_id, store_id) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    println!("Seeded catalog");
    Ok(())
}
