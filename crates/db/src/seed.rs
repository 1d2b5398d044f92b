//! Deterministic demo portfolio: three San Francisco buildings with rooms,
//! a handful of operators, leads and tenants.

use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::models::room::RoomStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub operators: usize,
    pub buildings: usize,
    pub rooms: usize,
    pub tenants: usize,
    pub leads: usize,
}

struct BuildingSeed {
    building_id: &'static str,
    building_name: &'static str,
    full_address: &'static str,
    operator_id: i64,
    street: &'static str,
    area: &'static str,
    zip: &'static str,
    floors: i64,
    total_rooms: i64,
    total_bathrooms: i64,
    base_rent: f64,
    premium: f64,
}

const OPERATORS: [(&str, &str, &str, &str, &str); 5] = [
    ("John Manager", "john.manager@homewiz.com", "(415)555-0101", "Property Manager", "BUILDING_MANAGER"),
    ("Sarah Admin", "sarah.admin@homewiz.com", "(415)555-0102", "Assistant Manager", "ADMIN"),
    ("Mike Maintenance", "mike.maintenance@homewiz.com", "(415)555-0103", "Maintenance", "MAINTENANCE"),
    ("Lisa Leasing", "lisa.leasing@homewiz.com", "(415)555-0104", "Leasing Agent", "LEASING_AGENT"),
    ("Tom Support", "tom.support@homewiz.com", "(415)555-0105", "Leasing Agent", "LEASING_AGENT"),
];

const BUILDINGS: [BuildingSeed; 3] = [
    BuildingSeed {
        building_id: "BLD_MARKET",
        building_name: "Market Street Residences",
        full_address: "1000 Market St",
        operator_id: 1,
        street: "Market St",
        area: "Downtown",
        zip: "94102",
        floors: 8,
        total_rooms: 20,
        total_bathrooms: 16,
        base_rent: 2200.0,
        premium: 1.3,
    },
    BuildingSeed {
        building_id: "BLD_SOMA",
        building_name: "SoMA Commons",
        full_address: "500 Harrison St",
        operator_id: 2,
        street: "Harrison St",
        area: "SoMA",
        zip: "94105",
        floors: 6,
        total_rooms: 15,
        total_bathrooms: 12,
        base_rent: 1900.0,
        premium: 1.2,
    },
    BuildingSeed {
        building_id: "BLD_MISSION",
        building_name: "Mission Heights",
        full_address: "2500 Mission St",
        operator_id: 3,
        street: "Mission St",
        area: "Mission",
        zip: "94110",
        floors: 5,
        total_rooms: 15,
        total_bathrooms: 10,
        base_rent: 1700.0,
        premium: 1.1,
    },
];

const BATHROOM_TYPES: [&str; 3] = ["Private", "En-Suite", "Shared"];
const BED_SIZES: [&str; 3] = ["Twin", "Full", "Queen"];
const VIEWS: [&str; 4] = ["Street", "City", "Bay", "Garden"];

struct SeededRoom {
    room_id: String,
    room_number: String,
    building_id: &'static str,
    status: RoomStatus,
}

/// Populate an empty database. Does nothing once any building exists.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<SeedSummary, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "Skipping demo seed, buildings already present");
        return Ok(SeedSummary::default());
    }

    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for (i, (name, email, phone, role, operator_type)) in OPERATORS.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO operators (operator_id, name, email, phone, role, active, date_joined, last_active, operator_type)
               VALUES ($1, $2, $3, $4, $5, 1, '2024-06-01', '2024-12-01', $6)"#,
        )
        .bind(i as i64 + 1)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(role)
        .bind(operator_type)
        .execute(&mut *tx)
        .await?;
        summary.operators += 1;
    }

    let mut rooms = Vec::new();
    for building in &BUILDINGS {
        insert_building(&mut tx, building).await?;
        summary.buildings += 1;

        let rooms_per_floor = building.total_rooms / building.floors;
        for floor in 1..=building.floors {
            for number in 1..=rooms_per_floor {
                let room = insert_room(&mut tx, building, floor, number, rooms.len()).await?;
                rooms.push(room);
            }
        }
    }
    summary.rooms = rooms.len();

    let occupied: Vec<&SeededRoom> = rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Occupied)
        .collect();
    let tenants = [
        ("TNT_001", "Alex Chen", "alex.chen@email.com", "Canada"),
        ("TNT_002", "Priya Patel", "priya.patel@email.com", "India"),
    ];
    for ((tenant_id, name, email, nationality), room) in tenants.iter().zip(occupied) {
        sqlx::query(
            r#"INSERT INTO tenants (tenant_id, tenant_name, room_id, room_number, lease_start_date, lease_end_date,
                                    operator_id, booking_type, tenant_nationality, tenant_email, building_id,
                                    status, deposit_amount, payment_status)
               VALUES ($1, $2, $3, $4, '2024-09-01', '2025-08-31', 4, 'LONG_TERM', $5, $6, $7, 'ACTIVE', 1500.0, 'CURRENT')"#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(&room.room_id)
        .bind(&room.room_number)
        .bind(nationality)
        .bind(email)
        .bind(room.building_id)
        .execute(&mut *tx)
        .await?;
        summary.tenants += 1;
    }

    let available: Vec<&str> = rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Available)
        .take(3)
        .map(|r| r.room_id.as_str())
        .collect();
    let leads = [
        ("LEAD_001", "sarah.smith@email.com", "EXPLORING", 2, &available[..1], None, "US-CITIZEN"),
        ("LEAD_002", "john.doe@email.com", "EXPLORING", 5, &available[..], None, "F1-VISA"),
        ("LEAD_003", "emily.wong@email.com", "SHOWING_SCHEDULED", 8, &available[1..], available.get(1).copied(), "H1B-VISA"),
    ];
    for (lead_id, email, status, interactions, interested, selected, visa) in leads {
        let rooms_interested = serde_json::to_string(interested)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query(
            r#"INSERT INTO leads (lead_id, email, status, interaction_count, rooms_interested, selected_room_id, visa_status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(lead_id)
        .bind(email)
        .bind(status)
        .bind(interactions)
        .bind(rooms_interested)
        .bind(selected)
        .bind(visa)
        .execute(&mut *tx)
        .await?;
        summary.leads += 1;
    }

    tx.commit().await?;
    info!(?summary, "Seeded demo data");
    Ok(summary)
}

async fn insert_building(
    tx: &mut Transaction<'_, Sqlite>,
    building: &BuildingSeed,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO buildings (building_id, building_name, full_address, operator_id, street, area, city, state, zip,
                                  floors, total_rooms, total_bathrooms, wifi_included, laundry_onsite)
           VALUES ($1, $2, $3, $4, $5, $6, 'San Francisco', 'CA', $7, $8, $9, $10, 1, 1)"#,
    )
    .bind(building.building_id)
    .bind(building.building_name)
    .bind(building.full_address)
    .bind(building.operator_id)
    .bind(building.street)
    .bind(building.area)
    .bind(building.zip)
    .bind(building.floors)
    .bind(building.total_rooms)
    .bind(building.total_bathrooms)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_room(
    tx: &mut Transaction<'_, Sqlite>,
    building: &BuildingSeed,
    floor: i64,
    number: i64,
    index: usize,
) -> Result<SeededRoom, sqlx::Error> {
    let room_number = format!("{}{:02}", floor, number);
    let room_id = format!("{}_R{}", building.building_id, room_number);
    let floor_premium = 1.0 + (floor - 1) as f64 * 0.05;
    let rent = (building.base_rent * building.premium * floor_premium * 100.0).round() / 100.0;
    // Every fourth room is let out.
    let status = if index % 4 == 3 {
        RoomStatus::Occupied
    } else {
        RoomStatus::Available
    };

    sqlx::query(
        r#"INSERT INTO rooms (room_id, room_number, building_id, floor_number, maximum_people_in_room, private_room_rent,
                              bathroom_type, bed_size, bed_type, view, sq_footage, bedrooms, furnished, pet_friendly, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1, $12, $13, $14)"#,
    )
    .bind(&room_id)
    .bind(&room_number)
    .bind(building.building_id)
    .bind(floor)
    .bind(1 + (index % 2) as i64)
    .bind(rent)
    .bind(BATHROOM_TYPES[index % BATHROOM_TYPES.len()])
    .bind(BED_SIZES[index % BED_SIZES.len()])
    .bind(if index % 2 == 0 { "Platform" } else { "Single" })
    .bind(VIEWS[index % VIEWS.len()])
    .bind(200 + (index as i64 * 37) % 200)
    .bind(index % 2 == 0)
    .bind(index % 3 == 0)
    .bind(status.to_string())
    .execute(&mut **tx)
    .await?;

    Ok(SeededRoom {
        room_id,
        room_number,
        building_id: building.building_id,
        status,
    })
}
