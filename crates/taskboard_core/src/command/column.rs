//! Column requests.

use super::{COLUMN_ORDER_MAX, NAME_MAX_LEN, WIP_LIMIT_MAX};
use crate::error::CoreResult;
use crate::model::board::BoardId;
use crate::model::column::{Column, ColumnId};
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::ColumnService;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateColumn {
    pub board_id: BoardId,
    pub name: String,
    pub order: i32,
    /// `None` leaves the column unlimited.
    pub wip_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateColumn {
    pub column_id: ColumnId,
    pub name: String,
    pub order: i32,
    pub wip_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteColumn {
    pub column_id: ColumnId,
}

fn column_rules(name: &str, order: i32, wip_limit: Option<u32>) -> Rules {
    let rules = Rules::new()
        .not_blank("name", name)
        .max_len("name", name, NAME_MAX_LEN)
        .range("order", order, 0, COLUMN_ORDER_MAX);
    match wip_limit {
        Some(limit) => rules.range("wip_limit", limit, 1, WIP_LIMIT_MAX),
        None => rules,
    }
}

impl Validate for CreateColumn {
    fn validate(&self) -> Result<(), ValidationErrors> {
        column_rules(&self.name, self.order, self.wip_limit).finish()
    }
}

impl Operation for CreateColumn {
    const NAME: &'static str = "create_column";
    const MUTATES: bool = true;
    type Output = Column;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Column> {
        ColumnService::new(ctx).create_column(self)
    }
}

impl Validate for UpdateColumn {
    fn validate(&self) -> Result<(), ValidationErrors> {
        column_rules(&self.name, self.order, self.wip_limit).finish()
    }
}

impl Operation for UpdateColumn {
    const NAME: &'static str = "update_column";
    const MUTATES: bool = true;
    type Output = Column;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Column> {
        ColumnService::new(ctx).update_column(self)
    }
}

impl Validate for DeleteColumn {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for DeleteColumn {
    const NAME: &'static str = "delete_column";
    const MUTATES: bool = true;
    type Output = Column;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Column> {
        ColumnService::new(ctx).delete_column(self)
    }
}

#[cfg(test)]
mod tests {
    use super::CreateColumn;
    use crate::pipeline::Validate;
    use uuid::Uuid;

    #[test]
    fn rejects_zero_wip_limit_and_negative_order() {
        let request = CreateColumn {
            board_id: Uuid::new_v4(),
            name: "Review".to_string(),
            order: -1,
            wip_limit: Some(0),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field("order").is_some());
        assert!(errors.field("wip_limit").is_some());
        assert!(errors.field("name").is_none());
    }
}
