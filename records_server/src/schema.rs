//! Diesel table definitions for the school records store.
//!
//! Tables: students, subjects, grades. Grades reference both parents with
//! cascading foreign keys (see `migration.rs`).

diesel::table! {
    students (student_id) {
        student_id -> Int8,
        name -> Varchar,
        group -> Varchar,
        email -> Varchar,
    }
}

diesel::table! {
    subjects (subject_id) {
        subject_id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    grades (grade_id) {
        grade_id -> Int8,
        student_id -> Int8,
        subject_id -> Int8,
        grade -> Numeric,
    }
}

// Foreign key relationships
diesel::joinable!(grades -> students (student_id));
diesel::joinable!(grades -> subjects (subject_id));

diesel::allow_tables_to_appear_in_same_query!(students, subjects, grades,);
