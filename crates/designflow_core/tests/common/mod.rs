#![allow(dead_code)]

use designflow_core::model::catalog::{CatalogService, DirectoryUser, PricingPolicy, ProcessStep};
use designflow_core::pricing::price_order_item;
use designflow_core::repo::catalog_repo::CatalogRepository;
use designflow_core::repo::user_repo::UserDirectory;
use designflow_core::{ClientInfo, Contact, OrderItem, SqliteRepositories};
use uuid::Uuid;

/// 2024-03-10T09:00:00Z
pub const NOW: i64 = 1_710_061_200_000;

pub fn client() -> ClientInfo {
    ClientInfo {
        client_id: Some(Uuid::new_v4()),
        client_name: "Harbor Cafe".to_string(),
        contacts: vec![Contact {
            contact_id: Uuid::new_v4(),
            name: "Mina".to_string(),
            phone: "555-0100".to_string(),
        }],
    }
}

pub fn seed_service(
    repos: &SqliteRepositories<'_>,
    name: &str,
    unit_price: f64,
    steps: Vec<ProcessStep>,
    policies: &[PricingPolicy],
) -> CatalogService {
    for policy in policies {
        repos.catalog.upsert_pricing_policy(policy).unwrap();
    }
    let mut service = CatalogService::new(name, unit_price, "set");
    service.category_name = "Interior".to_string();
    service.process_steps = steps;
    service.pricing_policy_ids = policies.iter().map(|policy| policy.id).collect();
    repos.catalog.upsert_service(&service).unwrap();
    service
}

pub fn seed_user(repos: &SqliteRepositories<'_>, name: &str) -> Uuid {
    let user = DirectoryUser {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
    };
    repos.users.upsert_user(&user).unwrap();
    user.id
}

pub fn list_item(service: &CatalogService, quantity: f64) -> OrderItem {
    price_order_item(service, quantity, &[])
}
