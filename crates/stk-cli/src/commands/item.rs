use stk_core::requests::NewItem;
use stk_db::updates::item::ItemUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ItemCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk item`.
pub async fn handle(
    action: &ItemCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ItemCommands::Create {
            event,
            name,
            unit,
            quantity,
            price,
        } => {
            let mut new = NewItem::new(name.as_str(), unit.as_str()).with_quantity(*quantity);
            new.unit_price = *price;
            let item = ctx.service.create_item(&ctx.actor, event, new).await?;
            output(&item, flags.format)
        }
        ItemCommands::Get { id } => {
            let item = ctx.service.get_item(id).await?;
            output(&item, flags.format)
        }
        ItemCommands::List { event, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.config.general.default_limit);
            let items = ctx.service.list_items(event, limit).await?;
            output(&items, flags.format)
        }
        ItemCommands::Update {
            id,
            event,
            name,
            unit,
            price,
            clear_price,
        } => {
            let mut builder = ItemUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(unit) = unit {
                builder = builder.unit(unit.as_str());
            }
            if *clear_price {
                builder = builder.unit_price(None);
            } else if price.is_some() {
                builder = builder.unit_price(*price);
            }
            let item = ctx
                .service
                .update_item(&ctx.actor, event, id, builder.build())
                .await?;
            output(&item, flags.format)
        }
    }
}
