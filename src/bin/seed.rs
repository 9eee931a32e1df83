//! Seeds a database with demo support conversations
//!
//! (c) Softlandia 2025

use support_chat_admin::core::notify::ChangeNotifier;
use support_chat_admin::core::services::HandoffChatService;
use support_chat_admin::core::traits::ChatService;
use support_chat_admin::infrastructure::database::DatabaseConnection;
use support_chat_admin::infrastructure::entities::NewChat;
use support_chat_admin::infrastructure::repositories::DbChatRepository;

use di::{Injectable, ServiceCollection};
use log::info;
use uuid::Uuid;

const QUESTIONS: [&str; 10] = [
    "Hello, I have a question about my order.",
    "Can you help me with my account?",
    "I'm trying to find information about your services.",
    "I'd like to know more about your pricing.",
    "Is there a way to expedite my shipment?",
    "I think there's an issue with my recent purchase.",
    "How do I reset my password?",
    "What are your business hours?",
    "Do you offer international shipping?",
    "Can I get a refund for my order?",
];

const ANSWERS: [&str; 10] = [
    "I'd be happy to help you with your order. Could you please provide your order number?",
    "Of course! I can assist with your account. What specific issue are you experiencing?",
    "You can find detailed information about our services on our website, but I can also answer any specific questions you have.",
    "Our pricing varies based on the package you select. The basic package starts at $29.99 per month.",
    "Yes, we offer expedited shipping options. There's an additional fee of $15 for next-day delivery.",
    "I'm sorry to hear that. Let me look into your purchase and see what might be wrong.",
    "To reset your password, please go to the login page and click on 'Forgot Password'. You'll receive an email with instructions.",
    "Our customer service team is available Monday through Friday, 9 AM to 6 PM Eastern Time.",
    "Yes, we do offer international shipping to most countries. Shipping costs and delivery times vary by location.",
    "We offer full refunds within 30 days of purchase. Please provide your order number so I can process that for you.",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(ChangeNotifier::singleton())
        .add(DbChatRepository::scoped())
        .add(HandoffChatService::scoped())
        .build_provider()
        .unwrap();

    let connection = provider.get_required::<DatabaseConnection>();
    sqlx::migrate!().run(&**connection).await?;
    connection.ensure_read_column().await?;

    let service = provider.get_required::<dyn ChatService>();

    for (i, (question, answer)) in QUESTIONS.iter().zip(ANSWERS.iter()).enumerate() {
        let uuid = format!("chat-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let chat = service
            .create_chat(NewChat {
                uuid: Some(uuid),
                waiting: Some(false),
                ai: Some(true),
            })
            .await?;

        service
            .customer_message_arrives(chat.id, question.to_string())
            .await?;
        service
            .responder_replies(chat.id, answer.to_string())
            .await?;

        // Walk each chat into a different hand-off state so the seeded set
        // covers the reachable flag combinations.
        match i % 4 {
            1 => {
                service.take_over(chat.id).await?;
            }
            2 => {
                service.take_over(chat.id).await?;
                service.operator_opens_chat(chat.id).await?;
                let follow_up = ANSWERS[(i + 1) % ANSWERS.len()];
                service
                    .responder_replies(chat.id, follow_up.to_string())
                    .await?;
            }
            3 => {
                service.take_over(chat.id).await?;
                service.return_to_ai(chat.id).await?;
            }
            _ => {}
        }

        info!("seeded chat {} as {}", chat.id, chat.uuid);
    }

    info!("seeded {} chats", QUESTIONS.len());
    Ok(())
}
