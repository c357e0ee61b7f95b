//! Role-based navigation

use axum::Json;
use serde::Serialize;
use shared::{Role, Section};

use crate::middleware::CurrentUser;

#[derive(Debug, Serialize)]
pub struct NavigationEntry {
    pub section: Section,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub username: String,
    pub role: Role,
    pub role_label: &'static str,
    pub sections: Vec<NavigationEntry>,
}

/// Sections the caller's role may open
pub async fn get_navigation(current_user: CurrentUser) -> Json<NavigationResponse> {
    let user = current_user.0;
    let sections = user
        .role
        .navigation()
        .into_iter()
        .map(|section| NavigationEntry {
            section,
            title: section.title(),
        })
        .collect();

    Json(NavigationResponse {
        username: user.username,
        role: user.role,
        role_label: user.role.label(),
        sections,
    })
}
