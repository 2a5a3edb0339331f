//! Canonical demo accounts written into an empty workspace.

use serde_json::{json, Map, Value};

use crate::users::{Role, UserRecord};

pub const DEMO_PASSWORD: &str = "password";

#[allow(clippy::too_many_arguments)]
fn demo(
    id: i64,
    username: &str,
    role: Role,
    parent_id: Option<i64>,
    full_name: &str,
    email: &str,
    phone: &str,
    extra: Value,
    created_at: &str,
) -> UserRecord {
    UserRecord {
        id,
        username: username.to_string(),
        password: DEMO_PASSWORD.to_string(),
        role,
        parent_id: Some(parent_id),
        full_name: Some(full_name.to_string()),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        created_at: Some(created_at.to_string()),
        extra: match extra {
            Value::Object(m) => m,
            _ => Map::new(),
        },
    }
}

/// Demo records with plaintext passwords; the store runs them through the
/// active credential scheme before persisting.
///
/// Student 3 belongs to parent 4 and student 6 to parent 7, recorded on
/// both sides (`parentId` and `children`).
pub fn demo_users(created_at: &str) -> Vec<UserRecord> {
    vec![
        demo(
            1,
            "admin",
            Role::Admin,
            None,
            "Administrator",
            "admin@edumart.com",
            "+1-555-0101",
            json!({}),
            created_at,
        ),
        demo(
            2,
            "teacher",
            Role::Teacher,
            None,
            "Sarah Johnson",
            "sarah.johnson@edumart.com",
            "+1-555-0102",
            json!({ "subject": "Mathematics", "experience": "5 years" }),
            created_at,
        ),
        demo(
            3,
            "student",
            Role::Student,
            Some(4),
            "John Smith",
            "john.smith@student.edumart.com",
            "+1-555-0103",
            json!({
                "grade": "10th Grade",
                "studentId": "STU001",
                "dateOfBirth": "2008-05-15"
            }),
            created_at,
        ),
        demo(
            4,
            "parent",
            Role::Parent,
            None,
            "Michael Smith",
            "michael.smith@parent.edumart.com",
            "+1-555-0104",
            json!({ "children": [3], "occupation": "Engineer" }),
            created_at,
        ),
        demo(
            5,
            "teacher2",
            Role::Teacher,
            None,
            "Emily Davis",
            "emily.davis@edumart.com",
            "+1-555-0105",
            json!({ "subject": "Science", "experience": "8 years" }),
            created_at,
        ),
        demo(
            6,
            "student2",
            Role::Student,
            Some(7),
            "Emma Wilson",
            "emma.wilson@student.edumart.com",
            "+1-555-0106",
            json!({
                "grade": "9th Grade",
                "studentId": "STU002",
                "dateOfBirth": "2009-03-22"
            }),
            created_at,
        ),
        demo(
            7,
            "parent2",
            Role::Parent,
            None,
            "Jennifer Wilson",
            "jennifer.wilson@parent.edumart.com",
            "+1-555-0107",
            json!({ "children": [6], "occupation": "Doctor" }),
            created_at,
        ),
    ]
}
