mod auth;
mod categories;
mod expenses;
mod health_check;
mod labour;
mod loans;
mod sub_categories;
mod unit_types;

pub use auth::{login, me, refresh};
pub use categories::{create_category, delete_category, list_categories, update_category};
pub use expenses::{
    create_expense, delete_expense, get_expense, list_expenses, update_expense,
};
pub use health_check::health_check;
pub use labour::{
    create_labour_type, create_labour_works, delete_labour_type, delete_labour_works,
    list_labour_types, list_labour_works, update_labour_work,
};
pub use loans::{create_loan, delete_loan, list_loans};
pub use sub_categories::{
    create_sub_category, delete_sub_category, list_sub_categories, update_sub_category,
};
pub use unit_types::{create_unit_type, delete_unit_type, list_unit_types};
