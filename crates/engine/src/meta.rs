//! Key/value metadata stored next to the Kakebo tables.

use sea_orm::entity::prelude::*;

pub(crate) const TABLE_NAME: &str = "kakebo_meta";
pub(crate) const PASSWORD_VERIFIER_KEY: &str = "password_verifier";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kakebo_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
