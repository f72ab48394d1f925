//! Database seeder for Tapiz development and testing.
//!
//! Seeds the default status catalog and a demo order for local
//! development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

use tapiz_db::entities::{orders, status_definitions};

/// Demo order ID (consistent for all seeds)
const DEMO_ORDER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tapiz_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding status catalog...");
    seed_status_catalog(&db).await;

    println!("Seeding demo order...");
    seed_demo_order(&db).await;

    println!("Seeding complete!");
}

fn demo_order_id() -> Uuid {
    Uuid::parse_str(DEMO_ORDER_ID).unwrap()
}

/// Seeds the default status catalog.
///
/// Three ordinary workflow statuses followed by the three end states,
/// one per terminal subtype.
async fn seed_status_catalog(db: &DatabaseConnection) {
    let existing = status_definitions::Entity::find()
        .count(db)
        .await
        .expect("Failed to count status definitions");
    if existing > 0 {
        println!("  Status catalog already seeded, skipping...");
        return;
    }

    let statuses: [(&str, &str, &str, Option<&str>, bool); 6] = [
        ("New", "new", "#3b82f6", None, true),
        ("In Progress", "in-progress", "#f59e0b", None, false),
        ("Ready", "ready", "#8b5cf6", None, false),
        ("Done", "done", "#22c55e", Some("done"), false),
        ("Cancelled", "cancelled", "#ef4444", Some("cancelled"), false),
        ("On Hold", "on-hold", "#6b7280", Some("pending"), false),
    ];

    let now = Utc::now();
    for (position, (label, value, color, end_state_type, is_default)) in
        statuses.into_iter().enumerate()
    {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let sort_order = position as i32 + 1;

        let model = status_definitions::ActiveModel {
            id: Set(Uuid::new_v4()),
            label: Set(label.to_string()),
            value: Set(value.to_string()),
            color: Set(color.to_string()),
            description: Set(None),
            is_end_state: Set(end_state_type.is_some()),
            end_state_type: Set(end_state_type.map(ToString::to_string)),
            is_default: Set(is_default),
            sort_order: Set(sort_order),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        if let Err(e) = model.insert(db).await {
            eprintln!("Failed to insert status '{value}': {e}");
        } else {
            println!("  Created status: {label}");
        }
    }
}

/// Seeds a demo order in the default status.
async fn seed_demo_order(db: &DatabaseConnection) {
    if orders::Entity::find_by_id(demo_order_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo order already exists, skipping...");
        return;
    }

    let default_status = status_definitions::Entity::find()
        .filter(status_definitions::Column::IsDefault.eq(true))
        .one(db)
        .await
        .expect("Failed to query default status")
        .expect("No default status seeded");

    let now = Utc::now();
    let order = orders::ActiveModel {
        id: Set(demo_order_id()),
        personal_info: Set(json!({
            "full_name": "Marta Kovacs",
            "phone": "+31 6 1234 5678",
            "address": "Herengracht 12, Amsterdam"
        })),
        order_details: Set(json!({
            "invoice_number": "INV-0001",
            "description": "Two-seater sofa reupholstery",
            "platform": "showroom",
            "timeline": "14"
        })),
        line_groups: Set(json!([{
            "furniture_type": "sofa",
            "material_company": "Kvadrat",
            "material_code": "KV-2041",
            "material_quantity": "6",
            "material_unit_price": "45.50",
            "labour_unit_price": "80",
            "labour_quantity": "2",
            "foam_enabled": true,
            "foam_unit_price": "35",
            "foam_quantity": "2"
        }])),
        payment_state: Set(json!({
            "deposit_required": "100",
            "amount_paid": "100",
            "pickup_delivery_enabled": true,
            "pickup_delivery_cost": "40",
            "payment_history": [{
                "amount": "100",
                "date": now,
                "kind": "deposit",
                "method": "cash",
                "description": "Deposit at intake"
            }]
        })),
        status_value: Set(default_status.value),
        cancellation_reason: Set(None),
        cancelled_at: Set(None),
        completed_at: Set(None),
        pending_at: Set(None),
        expected_resume_date: Set(None),
        pending_notes: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    if let Err(e) = order.insert(db).await {
        eprintln!("Failed to insert demo order: {e}");
    } else {
        println!("  Created demo order for Marta Kovacs");
    }
}
