use std::any::Any;

use url::Url;

use crate::document::JsonObjectBuilder;
use crate::mapper::PageEvent;
use crate::pagination::{PAGE_PARAM, PER_PAGE_PARAM, Pagination};
use crate::routes::Page;

use super::walk::Walker;
use super::{WriterContext, Written};

/// Writes one page of a collection: page metadata, every item the catalog
/// can place, then collection-level operations.
pub struct PageWriter<'c, 'a> {
    ctx: &'c WriterContext<'a>,
}

impl<'c, 'a> PageWriter<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c WriterContext<'a>) -> Self {
        Self { ctx }
    }

    /// `None` when no page or model mapper is available.
    #[must_use]
    pub fn write<M: Any>(&self, page: &Page<M>) -> Option<Written> {
        let ctx = self.ctx;
        let request = ctx.request();
        let mappers = ctx.mappers();
        let Some(mapper) = mappers
            .page
            .select(ctx.media_type(), request, ctx.default_media_type())
        else {
            tracing::debug!(media_type = ctx.media_type(), "no page mapper available");
            return None;
        };
        let Some(model_mapper) = mappers
            .model
            .select(mapper.media_type(), request, ctx.default_media_type())
        else {
            tracing::debug!(media_type = mapper.media_type(), "no model mapper available");
            return None;
        };

        let mut document = JsonObjectBuilder::new();
        let emit = |event: PageEvent<'_>, document: &mut JsonObjectBuilder| {
            mapper.on_page(event, document, request);
        };

        emit(PageEvent::Start, &mut document);
        self.write_links(page, &emit, &mut document);

        let walker = Walker::new(ctx, model_mapper);
        let mut written = 0;
        for (index, item) in page.items().iter().enumerate() {
            let Some(subject) = walker.locate(item.model()) else {
                tracing::debug!(index, collection = page.path(), "page item skipped");
                continue;
            };
            emit(PageEvent::ItemStarted { index }, &mut document);
            let mut item_document = JsonObjectBuilder::new();
            walker.write(&subject, item.operations(), &mut item_document);
            emit(
                PageEvent::ItemFinished {
                    index,
                    document: item_document,
                },
                &mut document,
            );
            written += 1;
        }
        emit(PageEvent::ItemCount(written), &mut document);

        for operation in page.operations() {
            let target = request.absolute(operation.target());
            let expects = operation.form().map(|f| request.absolute(&f.path()));
            emit(
                PageEvent::OperationStarted {
                    operation,
                    target: &target,
                    expects: expects.as_deref(),
                },
                &mut document,
            );
            emit(PageEvent::OperationFinished { operation }, &mut document);
        }

        emit(PageEvent::Finish, &mut document);
        Some(ctx.written(mapper.media_type(), document.build()))
    }

    /// Total count, collection URL and page navigation. `next` and
    /// `previous` only exist when there is a page in that direction.
    fn write_links<M, F>(&self, page: &Page<M>, emit: &F, document: &mut JsonObjectBuilder)
    where
        F: Fn(PageEvent<'_>, &mut JsonObjectBuilder),
    {
        let pagination = page.pagination();
        let collection = self.ctx.request().absolute(page.path());
        let url = |number: u64| self.page_url(&collection, pagination.with_page(number));

        emit(PageEvent::TotalCount(page.total()), document);
        emit(PageEvent::CollectionUrl(&collection), document);
        emit(PageEvent::FirstPage(&url(1)), document);
        emit(PageEvent::CurrentPage(&url(pagination.page())), document);
        emit(PageEvent::LastPage(&url(pagination.last_page(page.total()))), document);
        if page.has_next() {
            emit(PageEvent::NextPage(&url(pagination.page() + 1)), document);
        }
        if page.has_previous() {
            emit(PageEvent::PreviousPage(&url(pagination.page() - 1)), document);
        }
    }

    /// `collection` with the request's other query parameters kept and the
    /// page parameters replaced.
    fn page_url(&self, collection: &str, pagination: Pagination) -> String {
        let Ok(mut url) = Url::parse(collection) else {
            return collection.to_owned();
        };
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, value) in self.ctx.request().query_pairs() {
                if key != PAGE_PARAM && key != PER_PAGE_PARAM {
                    query.append_pair(key, value);
                }
            }
            query
                .append_pair(PAGE_PARAM, &pagination.page().to_string())
                .append_pair(PER_PAGE_PARAM, &pagination.per_page().to_string());
        }
        url.into()
    }
}
