//! Fixed demo data served when the backing store is unreachable.
//! Mirrors the seed set of the dashboard so the UI stays usable
//! without a database.

use time::{Duration, OffsetDateTime};

use crate::db::{
    ticket::{Category, Id, Status},
    Ticket,
};

/// The multimedia team's designer roster.
pub const DESIGNERS: [&str; 3] =
    ["設計師 蔡OO", "設計師 李OO", "設計師 黃OO"];

/// The two requesting units of the demo data set.
pub const UNITS: [&str; 2] = ["護理部", "內科"];

#[allow(clippy::too_many_arguments)]
fn ticket(
    n: u128,
    code: &str,
    unit: &str,
    applicant_name: &str,
    role_type: &str,
    ext: &str,
    purpose: &str,
    category: Category,
    status: Status,
    assigned_to_name: Option<&str>,
) -> Ticket {
    Ticket {
        id: Id::from(n),
        code: code.to_string(),
        unit: unit.to_string(),
        applicant_name: applicant_name.to_string(),
        role_type: role_type.to_string(),
        ext: ext.to_string(),
        purpose: purpose.to_string(),
        category,
        description: None,
        poster_size: None,
        poster_custom_size: None,
        flat_size: None,
        status,
        assigned_to_name: assigned_to_name.map(str::to_string),
        created_at: OffsetDateTime::now_utc() - Duration::minutes(n as i64),
    }
}

/// Ten active tickets plus a run of thirty completed ones.
pub fn demo_tickets() -> Vec<Ticket> {
    use Category::{DigitalPhotography, FlatDesign, PosterOutput};
    use Status::{Done, InProgress, Pending, WaitingReply};

    let mut tickets = vec![
        ticket(
            1, "E170-2025-0185", "護理部", "林小姐", "護理", "2211",
            "校院活動", PosterOutput, Pending, None,
        ),
        ticket(
            2, "E170-2025-0184", "內科", "陳醫師", "內科", "4501",
            "醫學發表", PosterOutput, Pending, None,
        ),
        ticket(
            3, "E170-2025-0183", "內科", "周醫師", "內科", "4503",
            "教學研究", FlatDesign, Pending, None,
        ),
        ticket(
            4, "E170-2025-0182", "護理部", "王小姐", "護理", "2216",
            "校院活動", DigitalPhotography, InProgress,
            Some("設計師 蔡OO"),
        ),
        ticket(
            5, "E170-2025-0181", "內科", "李醫師", "內科", "4505",
            "校院活動", DigitalPhotography, Pending, None,
        ),
        ticket(
            6, "E170-2025-0180", "護理部", "徐小姐", "護理", "2218",
            "衛教宣導", FlatDesign, Pending, None,
        ),
        ticket(
            7, "E170-2025-0179", "內科", "張醫師", "內科", "4507",
            "醫學發表", PosterOutput, InProgress, Some("設計師 蔡OO"),
        ),
        ticket(
            8, "E170-2025-0178", "護理部", "林小姐", "護理", "2211",
            "校院活動", PosterOutput, InProgress, Some("設計師 李OO"),
        ),
        ticket(
            9, "E170-2025-0177", "內科", "陳醫師", "內科", "4503",
            "教學研究", FlatDesign, WaitingReply, Some("設計師 蔡OO"),
        ),
        ticket(
            10, "E170-2025-0176", "護理部", "王小姐", "護理", "2216",
            "衛教宣導", DigitalPhotography, WaitingReply,
            Some("設計師 黃OO"),
        ),
    ];

    for index in 0..30u128 {
        let number = 1669 - index;
        let code = format!("E170-2025-{number:04}");
        let even = index % 2 == 0;
        tickets.push(ticket(
            100 + index,
            &code,
            if even { "護理部" } else { "內科" },
            if even { "林小姐" } else { "陳醫師" },
            if even { "護理" } else { "內科" },
            if even { "2211" } else { "4501" },
            if even { "校院活動" } else { "醫學發表" },
            if even { PosterOutput } else { FlatDesign },
            Done,
            Some(if even { "設計師 蔡OO" } else { "設計師 李OO" }),
        ));
    }

    tickets
}
