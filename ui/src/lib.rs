//! User interface for the AI Guardian moderation dashboard.
//!
//! A single iced application drives both the login and dashboard routes.
//! Every user action is a typed [`Message`]; the `update` loop owns the one
//! piece of mutable session state, the URL of the currently displayed page,
//! and funnels all page navigation and post-mutation refreshes through
//! [`GuardianUI::fetch_page`].

mod gallery;
mod image_loader;
mod pagination;
mod style;

pub use gallery::{
    build_cards, ImageCard, EMPTY_PLACEHOLDER, ERROR_PLACEHOLDER, LOADING_PLACEHOLDER,
};
pub use image_loader::{ImageLoader, ImageLoaderError};
pub use pagination::{derive_nav, PageNav};

use api_client::{ApiClient, ImagePage, ModerationOutcome};
use auth::{AuthClient, AuthState, User};
use iced::subscription;
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, image, progress_bar, row, scrollable, text, text_input, Column, Row,
};
use iced::{executor, theme, Application, Command, Element, Length, Settings, Subscription, Theme};
use rfd::AsyncFileDialog;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

use crate::style::Palette;

const TOAST_DURATION: Duration = Duration::from_secs(5);
const PROGRESS_LINGER: Duration = Duration::from_secs(2);

const LOGIN_REQUIRED_UPLOAD: &str = "You must be logged in to upload.";
const LOGIN_REQUIRED_ACTION: &str = "You must be logged in to perform this action.";
const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this image? This action cannot be undone.";

pub fn run(
    auth: Arc<AuthClient>,
    api_base_url: String,
    image_fetch_parallel: usize,
) -> iced::Result {
    GuardianUI::run(Settings::with_flags((
        auth,
        api_base_url,
        image_fetch_parallel,
    )))
}

#[derive(Debug, Clone)]
pub enum Message {
    AuthChanged(AuthState),
    EmailChanged(String),
    PasswordChanged(String),
    SignIn,
    SignUp,
    CredentialsResult(Result<(), String>),
    SignOut,
    LoadPage(Option<String>),
    PageLoaded(Result<ImagePage, String>),
    CardImageLoaded(i64, Result<Handle, String>),
    PickUpload,
    UploadPicked(Option<(String, Vec<u8>)>),
    UploadFinished(Result<ModerationOutcome, String>),
    HideProgress,
    RequestDelete(i64),
    ConfirmDelete,
    CancelDelete,
    DeleteFinished(Result<(), String>),
    ToastExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug)]
enum Route {
    Login,
    Dashboard,
}

#[derive(Debug)]
enum GalleryView {
    Loading,
    Loaded { cards: Vec<ImageCard>, nav: PageNav },
    Failed,
}

pub struct GuardianUI {
    auth: Arc<AuthClient>,
    auth_events: Arc<Mutex<mpsc::UnboundedReceiver<AuthState>>>,
    api_base_url: String,
    image_loader: ImageLoader,
    route: Route,
    current_user: Option<User>,
    email_input: String,
    password_input: String,
    login_error: Option<String>,
    current_page_url: String,
    gallery: GalleryView,
    card_images: HashMap<i64, Handle>,
    deleting_image: Option<i64>,
    toasts: Vec<Toast>,
    upload_in_flight: bool,
    upload_progress: f32,
    progress_visible: bool,
}

impl GuardianUI {
    /// Expose current state for testing purposes
    pub fn route_debug(&self) -> String {
        format!("{:?}", self.route)
    }

    pub fn gallery_debug(&self) -> String {
        format!("{:?}", self.gallery)
    }

    pub fn current_page_url(&self) -> String {
        self.current_page_url.clone()
    }

    pub fn current_user_email(&self) -> Option<String> {
        self.current_user.as_ref().map(|u| u.email.clone())
    }

    pub fn card_ids(&self) -> Vec<i64> {
        match &self.gallery {
            GalleryView::Loaded { cards, .. } => cards.iter().map(|c| c.id).collect(),
            _ => Vec::new(),
        }
    }

    pub fn page_label(&self) -> Option<String> {
        match &self.gallery {
            GalleryView::Loaded { nav, .. } => Some(nav.label()),
            _ => None,
        }
    }

    pub fn toast_count(&self) -> usize {
        self.toasts.len()
    }

    pub fn last_toast(&self) -> Option<(String, ToastKind)> {
        self.toasts.last().map(|t| (t.message.clone(), t.kind))
    }

    pub fn deleting_image(&self) -> Option<i64> {
        self.deleting_image
    }

    pub fn progress_visible(&self) -> bool {
        self.progress_visible
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload_in_flight
    }

    pub fn login_error(&self) -> Option<String> {
        self.login_error.clone()
    }

    fn first_page_url(&self) -> String {
        format!("{}/api/images/", self.api_base_url)
    }

    fn push_toast(&mut self, message: String, kind: ToastKind) -> Command<Message> {
        self.toasts.push(Toast { message, kind });
        Command::perform(
            async {
                sleep(TOAST_DURATION).await;
            },
            |_| Message::ToastExpired,
        )
    }

    /// Load one page of the gallery. Records the target URL as the current
    /// page before the request goes out; in-flight loads are never cancelled,
    /// so when two loads race the response that resolves last wins.
    fn fetch_page(&mut self, url: String) -> Command<Message> {
        if self.current_user.is_none() {
            return Command::none();
        }

        self.current_page_url = url.clone();
        self.gallery = GalleryView::Loading;

        let auth = self.auth.clone();
        let base_url = self.api_base_url.clone();
        Command::perform(
            async move {
                let token = auth.get_token().await.map_err(|e| e.to_string())?;
                let client = ApiClient::with_base_url(token, base_url);
                client.list_images(&url).await.map_err(|e| e.to_string())
            },
            Message::PageLoaded,
        )
    }

    /// Re-fetch the currently viewed page so it reflects server truth after
    /// a mutation. Deliberately not reset to page 1.
    fn refresh(&mut self) -> Command<Message> {
        self.fetch_page(self.current_page_url.clone())
    }

    fn linger_progress() -> Command<Message> {
        Command::perform(
            async {
                sleep(PROGRESS_LINGER).await;
            },
            |_| Message::HideProgress,
        )
    }
}

impl Application for GuardianUI {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = (Arc<AuthClient>, String, usize);

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let (auth, api_base_url, image_fetch_parallel) = flags;
        let auth_events = Arc::new(Mutex::new(auth.subscribe()));
        let first_page_url = format!("{}/api/images/", api_base_url);

        let app = Self {
            auth,
            auth_events,
            api_base_url,
            image_loader: ImageLoader::new(image_fetch_parallel),
            route: Route::Login,
            current_user: None,
            email_input: String::new(),
            password_input: String::new(),
            login_error: None,
            current_page_url: first_page_url,
            gallery: GalleryView::Loading,
            card_images: HashMap::new(),
            deleting_image: None,
            toasts: Vec::new(),
            upload_in_flight: false,
            upload_progress: 0.0,
            progress_visible: false,
        };

        (app, Command::none())
    }

    fn title(&self) -> String {
        String::from("AI Guardian - Moderation Dashboard")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::AuthChanged(AuthState::SignedIn(user)) => {
                tracing::info!(uid = %user.uid, "routing to dashboard");
                self.current_user = Some(user);
                self.route = Route::Dashboard;
                self.email_input.clear();
                self.password_input.clear();
                self.login_error = None;
                let first_page = self.first_page_url();
                return self.fetch_page(first_page);
            }
            Message::AuthChanged(AuthState::SignedOut) => {
                self.current_user = None;
                self.route = Route::Login;
                self.current_page_url = self.first_page_url();
                self.gallery = GalleryView::Loading;
                self.card_images.clear();
                self.deleting_image = None;
            }
            Message::EmailChanged(value) => {
                self.email_input = value;
            }
            Message::PasswordChanged(value) => {
                self.password_input = value;
            }
            Message::SignIn => {
                let auth = self.auth.clone();
                let email = self.email_input.clone();
                let password = self.password_input.clone();
                return Command::perform(
                    async move {
                        auth.sign_in(&email, &password)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::CredentialsResult,
                );
            }
            Message::SignUp => {
                let auth = self.auth.clone();
                let email = self.email_input.clone();
                let password = self.password_input.clone();
                return Command::perform(
                    async move {
                        auth.sign_up(&email, &password)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::CredentialsResult,
                );
            }
            Message::CredentialsResult(result) => {
                // Success arrives through the auth event stream; only the
                // provider rejection is surfaced here, verbatim.
                if let Err(message) = result {
                    self.login_error = Some(message);
                }
            }
            Message::SignOut => {
                self.auth.sign_out();
            }
            Message::LoadPage(url) => {
                let url = url.unwrap_or_else(|| self.first_page_url());
                return self.fetch_page(url);
            }
            Message::PageLoaded(Ok(page)) => {
                let cards = build_cards(&page.results);
                let nav = derive_nav(&page);

                let mut commands = Vec::new();
                for card in &cards {
                    if self.card_images.contains_key(&card.id) {
                        continue;
                    }
                    let loader = self.image_loader.clone();
                    let id = card.id;
                    let image_url = card.image_url.clone();
                    commands.push(Command::perform(
                        async move { loader.load(&image_url).await.map_err(|e| e.to_string()) },
                        move |result| Message::CardImageLoaded(id, result),
                    ));
                }

                self.gallery = GalleryView::Loaded { cards, nav };
                return Command::batch(commands);
            }
            Message::PageLoaded(Err(error)) => {
                tracing::error!("failed to load images: {}", error);
                self.gallery = GalleryView::Failed;
            }
            Message::CardImageLoaded(id, result) => match result {
                Ok(handle) => {
                    self.card_images.insert(id, handle);
                }
                Err(error) => {
                    // The card is rendered without its image; not surfaced.
                    tracing::warn!("failed to load image {}: {}", id, error);
                }
            },
            Message::PickUpload => {
                return Command::perform(
                    async {
                        match AsyncFileDialog::new().pick_file().await {
                            Some(file) => {
                                let name = file.file_name();
                                let bytes = file.read().await;
                                Some((name, bytes))
                            }
                            None => None,
                        }
                    },
                    Message::UploadPicked,
                );
            }
            Message::UploadPicked(Some((file_name, bytes))) => {
                if self.current_user.is_none() {
                    return self.push_toast(LOGIN_REQUIRED_UPLOAD.into(), ToastKind::Error);
                }

                self.upload_in_flight = true;
                self.progress_visible = true;
                self.upload_progress = 0.5;

                let auth = self.auth.clone();
                let base_url = self.api_base_url.clone();
                return Command::perform(
                    async move {
                        let token = auth.get_token().await.map_err(|e| e.to_string())?;
                        let client = ApiClient::with_base_url(token, base_url);
                        client
                            .moderate_image(&file_name, bytes)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::UploadFinished,
                );
            }
            Message::UploadPicked(None) => {}
            Message::UploadFinished(Ok(outcome)) => {
                self.upload_in_flight = false;
                self.upload_progress = 1.0;
                let toast = self.push_toast(
                    format!("Image processed: {}", outcome.status),
                    ToastKind::Success,
                );
                let refresh = self.refresh();
                return Command::batch(vec![toast, refresh, Self::linger_progress()]);
            }
            Message::UploadFinished(Err(error)) => {
                self.upload_in_flight = false;
                self.upload_progress = 0.0;
                let toast = self.push_toast(error, ToastKind::Error);
                return Command::batch(vec![toast, Self::linger_progress()]);
            }
            Message::HideProgress => {
                self.progress_visible = false;
                self.upload_progress = 0.0;
            }
            Message::RequestDelete(id) => {
                self.deleting_image = Some(id);
            }
            Message::CancelDelete => {
                // Declined confirmation aborts silently.
                self.deleting_image = None;
            }
            Message::ConfirmDelete => {
                if let Some(id) = self.deleting_image.take() {
                    if self.current_user.is_none() {
                        return self.push_toast(LOGIN_REQUIRED_ACTION.into(), ToastKind::Error);
                    }

                    let auth = self.auth.clone();
                    let base_url = self.api_base_url.clone();
                    return Command::perform(
                        async move {
                            let token = auth.get_token().await.map_err(|e| e.to_string())?;
                            let client = ApiClient::with_base_url(token, base_url);
                            client.delete_image(id).await.map_err(|e| e.to_string())
                        },
                        Message::DeleteFinished,
                    );
                }
            }
            Message::DeleteFinished(Ok(())) => {
                let toast =
                    self.push_toast("Image deleted successfully.".into(), ToastKind::Success);
                let refresh = self.refresh();
                return Command::batch(vec![toast, refresh]);
            }
            Message::DeleteFinished(Err(error)) => {
                return self.push_toast(error, ToastKind::Error);
            }
            Message::ToastExpired => {
                if !self.toasts.is_empty() {
                    self.toasts.remove(0);
                }
            }
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let auth_events = self.auth_events.clone();
        subscription::unfold("auth-events", auth_events, |rx| async move {
            let mut lock = rx.lock().await;
            let msg = match lock.recv().await {
                Some(state) => Message::AuthChanged(state),
                None => Message::AuthChanged(AuthState::SignedOut),
            };
            drop(lock);
            (msg, rx)
        })
    }

    fn view(&self) -> Element<Message> {
        match self.route {
            Route::Login => self.login_view(),
            Route::Dashboard => self.dashboard_view(),
        }
    }
}

impl GuardianUI {
    fn login_view(&self) -> Element<Message> {
        let mut content = column![
            text("AI Guardian").size(32),
            text("Sign in to moderate your images"),
            text_input("Email", &self.email_input).on_input(Message::EmailChanged),
            text_input("Password", &self.password_input)
                .secure(true)
                .on_input(Message::PasswordChanged),
            row![
                button("Log In")
                    .style(theme::Button::Primary)
                    .on_press(Message::SignIn),
                button("Sign Up")
                    .style(theme::Button::Secondary)
                    .on_press(Message::SignUp),
            ]
            .spacing(10),
        ]
        .spacing(Palette::SPACING)
        .max_width(400.0);

        if let Some(error) = &self.login_error {
            content = content.push(
                text(error.clone()).style(theme::Text::Color(Palette::ERROR)),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into()
    }

    fn dashboard_view(&self) -> Element<Message> {
        // The upload affordance is disabled while an upload is in flight.
        let mut upload_button = button("Upload Image").style(theme::Button::Primary);
        if !self.upload_in_flight {
            upload_button = upload_button.on_press(Message::PickUpload);
        }

        let header = row![
            text("AI Guardian").size(24),
            text(
                self.current_user_email()
                    .unwrap_or_else(|| String::from("not signed in"))
            ),
            upload_button,
            button("Log Out")
                .style(theme::Button::Secondary)
                .on_press(Message::SignOut),
        ]
        .spacing(Palette::SPACING)
        .align_items(iced::Alignment::Center);

        let mut page = Column::new()
            .spacing(Palette::SPACING)
            .padding(Palette::SPACING)
            .push(header);

        if self.progress_visible {
            page = page.push(
                progress_bar(0.0..=1.0, self.upload_progress).width(Length::Fixed(240.0)),
            );
        }

        for toast in &self.toasts {
            let style = match toast.kind {
                ToastKind::Success => style::toast_success(),
                ToastKind::Error => style::toast_error(),
            };
            page = page.push(
                container(text(toast.message.clone()))
                    .style(style)
                    .padding(10)
                    .width(Length::Fill),
            );
        }

        if self.deleting_image.is_some() {
            page = page.push(
                column![
                    text(DELETE_CONFIRMATION),
                    row![
                        button("Delete")
                            .style(theme::Button::Destructive)
                            .on_press(Message::ConfirmDelete),
                        button("Cancel")
                            .style(theme::Button::Secondary)
                            .on_press(Message::CancelDelete),
                    ]
                    .spacing(10),
                ]
                .spacing(10),
            );
        }

        page = page.push(self.gallery_view());

        if let GalleryView::Loaded { nav, .. } = &self.gallery {
            page = page.push(self.pagination_view(nav));
        }

        scrollable(page).into()
    }

    fn gallery_view(&self) -> Element<Message> {
        match &self.gallery {
            GalleryView::Loading => text(LOADING_PLACEHOLDER).into(),
            GalleryView::Failed => text(ERROR_PLACEHOLDER).into(),
            GalleryView::Loaded { cards, .. } => {
                if cards.is_empty() {
                    return text(EMPTY_PLACEHOLDER).into();
                }

                let mut grid = Row::new().spacing(Palette::SPACING);
                for card in cards {
                    grid = grid.push(self.card_view(card));
                }
                grid.into()
            }
        }
    }

    fn card_view(&self, card: &ImageCard) -> Element<Message> {
        let picture: Element<Message> = match self.card_images.get(&card.id) {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(200.0))
                .height(Length::Fixed(150.0))
                .into(),
            None => text("Loading...").into(),
        };

        let label_color = if card.flagged {
            Palette::FLAGGED
        } else {
            Palette::SAFE
        };

        container(
            column![
                picture,
                text(card.status_label.clone()).style(theme::Text::Color(label_color)),
                button("Delete")
                    .style(theme::Button::Destructive)
                    .on_press(Message::RequestDelete(card.id)),
            ]
            .spacing(10),
        )
        .style(style::card())
        .padding(10)
        .into()
    }

    fn pagination_view(&self, nav: &PageNav) -> Element<Message> {
        let mut previous = button("Previous").style(theme::Button::Secondary);
        if let Some(target) = &nav.previous {
            previous = previous.on_press(Message::LoadPage(Some(target.clone())));
        }

        let mut next = button("Next").style(theme::Button::Secondary);
        if let Some(target) = &nav.next {
            next = next.on_press(Message::LoadPage(Some(target.clone())));
        }

        row![previous, text(nav.label()), next]
            .spacing(Palette::SPACING)
            .align_items(iced::Alignment::Center)
            .into()
    }
}
