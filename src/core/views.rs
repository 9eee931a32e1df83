//! Materialized viewer state kept fresh by change notifications

use crate::core::directory::{DirectoryPage, DirectoryQuery, select_page};
use crate::core::notify::{ChangeNotifier, Handler, Topic};
use crate::core::traits::ChatService;
use crate::infrastructure::entities::{Chat, ChatSummary, Message};
use crate::infrastructure::error::StoreError;
use di::Ref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One dashboard's view of the chat directory.
///
/// The view caches the chat list it last fetched and the page projected from
/// it, and goes stale when the notifier reports a list change. A failed
/// refresh leaves the view stale so the next cycle retries. Query changes
/// re-project from the cached list without touching the store.
pub struct DirectoryView {
    service: Ref<dyn ChatService>,
    notifier: Ref<ChangeNotifier>,
    handler: Handler,
    stale: Arc<AtomicBool>,
    query: DirectoryQuery,
    chats: Vec<ChatSummary>,
    current: DirectoryPage,
}

impl DirectoryView {
    /// Subscribes to list changes. The view starts stale, refresh it once to
    /// materialize the first page.
    pub fn open(
        service: Ref<dyn ChatService>,
        notifier: Ref<ChangeNotifier>,
        query: DirectoryQuery,
    ) -> Self {
        let stale = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stale);
        let handler: Handler = Arc::new(move |_| flag.store(true, Ordering::SeqCst));
        notifier.subscribe(Topic::ChatListChanged, Arc::clone(&handler));
        Self {
            service,
            notifier,
            handler,
            stale,
            query,
            chats: Vec::new(),
            current: DirectoryPage::default(),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    pub fn query(&self) -> &DirectoryQuery {
        &self.query
    }

    /// The page as of the last successful refresh or query change.
    pub fn current(&self) -> &DirectoryPage {
        &self.current
    }

    /// Changes page, filter or sort and re-projects from the cached list.
    pub fn set_query(&mut self, query: DirectoryQuery) {
        self.query = query;
        self.current = select_page(&self.chats, &self.query);
    }

    /// Re-fetches the chat list and rebuilds the current page.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.stale.store(false, Ordering::SeqCst);
        match self.service.list_chats().await {
            Ok(chats) => {
                self.chats = chats;
                self.current = select_page(&self.chats, &self.query);
                Ok(())
            }
            Err(e) => {
                self.stale.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Refreshes only if a change was reported since the last refresh.
    /// Returns whether a refresh happened.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, StoreError> {
        if !self.stale.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.notifier.unsubscribe(Topic::ChatListChanged, &self.handler);
    }
}

impl Drop for DirectoryView {
    fn drop(&mut self) {
        self.close();
    }
}

/// One open thread: the chat's flags plus its ordered messages.
pub struct ThreadView {
    chat_id: i64,
    service: Ref<dyn ChatService>,
    notifier: Ref<ChangeNotifier>,
    handler: Handler,
    stale: Arc<AtomicBool>,
    chat: Option<Chat>,
    messages: Vec<Message>,
}

impl ThreadView {
    /// Subscribes to flag changes and new messages for one chat. The view
    /// starts stale, refresh it once to materialize the thread.
    pub fn open(service: Ref<dyn ChatService>, notifier: Ref<ChangeNotifier>, chat_id: i64) -> Self {
        let stale = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stale);
        let handler: Handler = Arc::new(move |_| flag.store(true, Ordering::SeqCst));
        notifier.subscribe(Topic::ChatChanged(chat_id), Arc::clone(&handler));
        notifier.subscribe(Topic::NewMessage(chat_id), Arc::clone(&handler));
        Self {
            chat_id,
            service,
            notifier,
            handler,
            stale,
            chat: None,
            messages: Vec::new(),
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// The chat flags as of the last successful refresh.
    pub fn chat(&self) -> Option<&Chat> {
        self.chat.as_ref()
    }

    /// The thread as of the last successful refresh, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Case-insensitive substring search over the cached thread. A blank
    /// term matches every message.
    pub fn search(&self, term: &str) -> Vec<&Message> {
        let needle = term.trim().to_lowercase();
        self.messages
            .iter()
            .filter(|m| m.message.to_lowercase().contains(&needle))
            .collect()
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.stale.store(false, Ordering::SeqCst);
        let chat = match self.service.get_chat(self.chat_id).await {
            Ok(chat) => chat,
            Err(e) => {
                self.stale.store(true, Ordering::SeqCst);
                return Err(e);
            }
        };
        match self.service.list_messages(self.chat_id).await {
            Ok(messages) => {
                self.chat = Some(chat);
                self.messages = messages;
                Ok(())
            }
            Err(e) => {
                self.stale.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Refreshes only if a change was reported since the last refresh.
    /// Returns whether a refresh happened.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, StoreError> {
        if !self.stale.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.notifier
            .unsubscribe(Topic::ChatChanged(self.chat_id), &self.handler);
        self.notifier
            .unsubscribe(Topic::NewMessage(self.chat_id), &self.handler);
    }
}

impl Drop for ThreadView {
    fn drop(&mut self) {
        self.close();
    }
}
