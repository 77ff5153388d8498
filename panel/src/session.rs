use crate::command::{Command, HELP, ImageAction};
use crate::render;
use common::config::Search;
use console::autocomplete::{AutocompleteView, DebouncedAutocomplete};
use console::catalog::{CityCatalogCache, CityLookup};
use console::filter::{FilterPatch, FilterState};
use console::form::{PropertyDraft, PropertyEditor};
use console::reconciler::{ListingView, ResultReconciler};
use requester::catalog::CatalogRequesterExt;
use requester::inventory::InventoryRequesterExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// One operator's console: the filter panel with its city field, the
/// listing, and a property form with a city field of its own. Both city
/// fields look cities up through the same cache.
pub struct Session<C, I> {
    city: DebouncedAutocomplete<CityLookup<C>>,
    form_city: DebouncedAutocomplete<CityLookup<C>>,
    reconciler: ResultReconciler<I>,
    editor: PropertyEditor<I>,
    inventory: Arc<I>,
    form: Mutex<Option<PropertyDraft>>,
    per_page: u32,
    max_suggestions: usize,
}

impl<C, I> Session<C, I>
where
    C: CatalogRequesterExt + Send + Sync + 'static,
    I: InventoryRequesterExt + Send + Sync + 'static,
{
    pub fn new(catalog: Arc<C>, inventory: Arc<I>, search: &Search) -> Self {
        let lookup = Arc::new(CityLookup::new(Arc::new(CityCatalogCache::new(catalog))));
        let delay = Duration::from_millis(search.debounce_ms);
        Self {
            city: DebouncedAutocomplete::with_delay(Arc::clone(&lookup), delay),
            form_city: DebouncedAutocomplete::with_delay(lookup, delay),
            reconciler: ResultReconciler::new(Arc::clone(&inventory)),
            editor: PropertyEditor::new(Arc::clone(&inventory)),
            inventory,
            form: Mutex::new(None),
            per_page: search.per_page,
            max_suggestions: search.max_suggestions,
        }
    }

    /// Loads the first page without any filter.
    pub fn start(&self) -> JoinHandle<()> {
        self.reconciler.submit(FilterState::initial(self.per_page))
    }

    pub fn listing(&self) -> watch::Receiver<ListingView> {
        self.reconciler.subscribe()
    }

    pub fn suggestions(&self) -> watch::Receiver<AutocompleteView> {
        self.city.subscribe()
    }

    pub fn form_suggestions(&self) -> watch::Receiver<AutocompleteView> {
        self.form_city.subscribe()
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    /// The open property form, if any.
    pub fn form(&self) -> Option<PropertyDraft> {
        self.form_slot().clone()
    }

    pub async fn execute(&self, command: Command) -> Outcome {
        debug!(?command, "executing");
        let listing = self.reconciler.snapshot();
        let editing = self.form_slot().is_some();
        let city_field = if editing { &self.form_city } else { &self.city };

        match command {
            Command::City(text) if text.is_empty() => {
                city_field.clear();
                if editing {
                    self.edit_form(|form| form.city.clear());
                } else {
                    self.change(FilterPatch::new().clear_city());
                }
            }
            Command::City(text) => city_field.set_query(text),
            Command::Select(n) => {
                let view = city_field.snapshot();
                match n
                    .checked_sub(1)
                    .and_then(|i| view.visible(self.max_suggestions).get(i))
                {
                    Some(city) => {
                        let name = city_field.select(city.name());
                        if editing {
                            self.edit_form(|form| form.city = name);
                        } else {
                            self.change(FilterPatch::new().city(name));
                        }
                    }
                    None => println!("no suggestion number {n}"),
                }
            }
            Command::Focus => city_field.focus(),
            Command::Dismiss => city_field.dismiss(),
            Command::Search(text) if text.trim().is_empty() => {
                self.change(FilterPatch::new().clear_search())
            }
            Command::Search(text) => self.change(FilterPatch::new().search(text)),
            Command::MinPrice(raw) => self.change(FilterPatch::new().min_price_input(&raw)),
            Command::MaxPrice(raw) => self.change(FilterPatch::new().max_price_input(&raw)),
            Command::ToggleBedroom(n) => {
                self.reconciler.submit(listing.filters.toggle_bedroom(n));
            }
            Command::Consignation(consignation_type) => {
                self.change(FilterPatch::new().consignation_type(consignation_type))
            }
            Command::PerPage(n) => self.change(FilterPatch::new().per_page(Some(n.max(1)))),
            Command::Next => self.change(listing.filters.next_page(listing.total_pages())),
            Command::Previous => self.change(listing.filters.previous_page()),
            Command::Page(n) => {
                self.change(FilterPatch::new().page(n.clamp(1, listing.total_pages().max(1))))
            }
            Command::Reset => {
                self.city.clear();
                self.reconciler.submit(listing.filters.reset());
            }
            Command::Show => println!("{}", render::listing(&listing)),
            Command::Get(id) => match self.inventory.fetch_property(id).await {
                Ok(property) => println!("{}", render::property_line(&property)),
                Err(e) => {
                    error!(id, "could not fetch property: {e}");
                    println!("could not load property {id}");
                }
            },
            Command::Delete(id) => match self.editor.delete(id).await {
                Ok(()) => {
                    println!("property {id} deleted");
                    self.reconciler.submit(listing.filters);
                }
                Err(e) => println!("{}", e.user_message()),
            },
            Command::New => self.open_form(PropertyDraft::default()),
            Command::Edit(id) => match self.inventory.fetch_property(id).await {
                Ok(property) => self.open_form(PropertyDraft::from(&property)),
                Err(e) => {
                    error!(id, "could not fetch property: {e}");
                    println!("could not load property {id}");
                }
            },
            Command::Set(value) => self.edit_form(|form| value.apply_to(form)),
            Command::Image(action) => self.edit_form(|form| match action {
                ImageAction::Add => form.add_image(),
                ImageAction::Set(slot, url) => form.set_image(slot.saturating_sub(1), url),
                ImageAction::Remove(slot) => {
                    if let Some(index) = slot.checked_sub(1) {
                        form.remove_image(index);
                    }
                }
            }),
            Command::Save => self.save_form(listing.filters).await,
            Command::Cancel => {
                if self.form_slot().take().is_some() {
                    self.form_city.clear();
                    println!("form discarded");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Outcome::Quit,
        }
        Outcome::Continue
    }

    fn change(&self, patch: FilterPatch) {
        self.reconciler.change(patch);
    }

    fn open_form(&self, form: PropertyDraft) {
        if form.city.is_empty() {
            self.form_city.clear();
        } else {
            self.form_city.select(form.city.clone());
        }
        println!("{}", render::draft(&form));
        *self.form_slot() = Some(form);
    }

    fn edit_form(&self, edit: impl FnOnce(&mut PropertyDraft)) {
        match self.form_slot().as_mut() {
            Some(form) => {
                edit(form);
                println!("{}", render::draft(form));
            }
            None => println!("no form open, use `new` or `edit <id>`"),
        }
    }

    /// The form stays open on failure so it can be corrected and saved
    /// again.
    async fn save_form(&self, filters: FilterState) {
        let Some(form) = self.form() else {
            println!("no form open, use `new` or `edit <id>`");
            return;
        };

        match self.editor.save(&form).await {
            Ok(saved) => {
                println!("property #{} saved", saved.id);
                self.form_slot().take();
                self.form_city.clear();
                self.reconciler.submit(filters);
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }

    fn form_slot(&self) -> MutexGuard<'_, Option<PropertyDraft>> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
