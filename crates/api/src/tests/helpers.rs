// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use time::{Date, Month};

use term_rollover_audit::Cause;
use term_rollover_domain::{
    AcademicSession, Division, Placement, PromotionMap, Student, StudentStatus, Term,
};
use term_rollover_persistence::{
    NewOperator, OperatorData, OperatorLookup, SqlitePersistence,
};

use crate::{
    AuthenticatedActor, ConfirmIdentityRequest, Role, admit_workflow, confirm_identity,
    request_confirmation,
};

pub const DIVISION: &str = "sec";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const STAFF_PASSWORD: &str = "battery staple";

/// Classes, sections and students created by [`seed_school`].
pub struct SchoolFixture {
    pub js1: i64,
    pub js2: i64,
    pub ss1: i64,
    pub section_a: i64,
    pub section_b: i64,
    pub ada: i64,
    pub bola: i64,
    pub chidi: i64,
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-1"), String::from("API request"))
}

pub fn division() -> Division {
    Division::new(DIVISION)
}

pub fn create_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().unwrap()
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A file-backed database that tests can also reach with raw SQL, for
/// installing triggers or removing rows the API never deletes.
///
/// The files are removed on drop.
pub struct ScratchDatabase {
    path: PathBuf,
}

impl ScratchDatabase {
    pub fn open() -> (Self, SqlitePersistence) {
        let path: PathBuf = std::env::temp_dir().join(format!(
            "term-rollover-api-{}-{}.db",
            std::process::id(),
            SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let persistence: SqlitePersistence = SqlitePersistence::new_with_file(&path).unwrap();
        (Self { path }, persistence)
    }

    /// Runs a statement on a second connection to the same file.
    pub fn execute(&self, sql: &str) {
        let mut conn = SqliteConnection::establish(self.path.to_str().unwrap()).unwrap();
        diesel::sql_query(sql).execute(&mut conn).unwrap();
    }

    /// Makes every update of one student's row fail.
    pub fn fail_student_updates(&self, student_id: i64) {
        self.execute(&format!(
            "CREATE TRIGGER fail_student_{student_id} BEFORE UPDATE ON students \
             WHEN OLD.student_id = {student_id} \
             BEGIN SELECT RAISE(ABORT, 'student {student_id} is locked'); END"
        ));
    }

    pub fn allow_student_updates(&self, student_id: i64) {
        self.execute(&format!("DROP TRIGGER fail_student_{student_id}"));
    }

    /// Makes the first write of one student's academic record fail.
    pub fn fail_record_inserts(&self, student_id: i64) {
        self.execute(&format!(
            "CREATE TRIGGER fail_record_{student_id} BEFORE INSERT ON student_academic_records \
             WHEN NEW.student_id = {student_id} \
             BEGIN SELECT RAISE(ABORT, 'record {student_id} is locked'); END"
        ));
    }
}

impl Drop for ScratchDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Creates an operator and returns it with its authenticated actor.
pub fn create_operator(
    persistence: &mut SqlitePersistence,
    login_name: &str,
    role: Role,
) -> (AuthenticatedActor, OperatorData) {
    let password: &str = match role {
        Role::Admin => ADMIN_PASSWORD,
        Role::Staff => STAFF_PASSWORD,
    };
    let operator_id: i64 = persistence
        .register_operator(&NewOperator {
            login_name,
            display_name: login_name,
            password,
            role: role.as_str(),
        })
        .unwrap();
    let operator: OperatorData = persistence
        .find_operator(OperatorLookup::Id(operator_id))
        .unwrap()
        .unwrap();
    (
        AuthenticatedActor::new(operator.login_name.clone(), role),
        operator,
    )
}

/// Creates First/Second/Third terms, the 2023/2024 session and a setting.
///
/// `current_term` is the order of the term the setting points at, or `None`
/// for no current term. The third term is the promotion term.
pub fn seed_calendar(
    persistence: &mut SqlitePersistence,
    current_term: Option<u32>,
    resumption: bool,
) {
    let mut term_ids: Vec<i64> = Vec::new();
    for (name, order, promotion) in [
        ("First Term", 1, false),
        ("Second Term", 2, false),
        ("Third Term", 3, true),
    ] {
        term_ids.push(
            persistence
                .create_term(&Term::new(name, order, promotion))
                .unwrap(),
        );
    }
    let session_id: i64 = persistence
        .create_academic_session(&AcademicSession::new(2023, 2024, "/", division()))
        .unwrap();

    let term_id: Option<i64> = current_term.map(|order| term_ids[order as usize - 1]);
    let resumption_date: Option<Date> =
        resumption.then(|| Date::from_calendar_date(2024, Month::September, 9).unwrap());
    persistence
        .save_academic_setting(&division(), session_id, term_id, resumption_date, None)
        .unwrap();
}

pub fn create_student(
    persistence: &mut SqlitePersistence,
    registration_number: &str,
    placement: Option<(i64, i64)>,
    status: StudentStatus,
) -> i64 {
    let student: Student = Student {
        student_id: 0,
        registration_number: registration_number.to_string(),
        full_name: format!("Student {registration_number}"),
        class_id: placement.map(|(c, _)| c),
        section_id: placement.map(|(_, s)| s),
        status,
        division: division(),
    };
    persistence.create_student(&student).unwrap()
}

/// Creates JS1, JS2 and SS1 with sections A and B and three students.
///
/// Ada is in JS1/A, Bola in JS2/A and Chidi in SS1/B; all are active.
/// No promotion maps are created.
pub fn seed_school(persistence: &mut SqlitePersistence) -> SchoolFixture {
    let js1: i64 = persistence.create_class("JS1", &division()).unwrap();
    let js2: i64 = persistence.create_class("JS2", &division()).unwrap();
    let ss1: i64 = persistence.create_class("SS1", &division()).unwrap();
    let section_a: i64 = persistence.create_section("A").unwrap();
    let section_b: i64 = persistence.create_section("B").unwrap();

    let active: StudentStatus = StudentStatus::Active;
    let ada: i64 = create_student(persistence, "REG-001", Some((js1, section_a)), active);
    let bola: i64 = create_student(persistence, "REG-002", Some((js2, section_a)), active);
    let chidi: i64 = create_student(persistence, "REG-003", Some((ss1, section_b)), active);

    SchoolFixture {
        js1,
        js2,
        ss1,
        section_a,
        section_b,
        ada,
        bola,
        chidi,
    }
}

/// Maps JS1/A to JS2/A, JS2/A to SS1/B and graduates SS1/B.
pub fn seed_promotion_maps(persistence: &mut SqlitePersistence, school: &SchoolFixture) {
    let maps: [PromotionMap; 3] = [
        PromotionMap {
            source: Placement::new(school.js1, school.section_a),
            target_class_id: Some(school.js2),
            target_section_id: Some(school.section_a),
            is_graduation_class: false,
        },
        PromotionMap {
            source: Placement::new(school.js2, school.section_a),
            target_class_id: Some(school.ss1),
            target_section_id: Some(school.section_b),
            is_graduation_class: false,
        },
        PromotionMap {
            source: Placement::new(school.ss1, school.section_b),
            target_class_id: None,
            target_section_id: None,
            is_graduation_class: true,
        },
    ];
    for map in &maps {
        persistence.upsert_promotion_map(map).unwrap();
    }
}

/// Runs the confirmation gate through to `Admitted`.
pub fn admit(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    operator: &OperatorData,
) {
    request_confirmation(persistence, DIVISION, actor, operator, create_test_cause()).unwrap();
    confirm_identity(
        persistence,
        DIVISION,
        &ConfirmIdentityRequest {
            credential: String::from(ADMIN_PASSWORD),
        },
        actor,
        operator,
        create_test_cause(),
    )
    .unwrap();
    admit_workflow(persistence, DIVISION, actor, operator, create_test_cause()).unwrap();
}
