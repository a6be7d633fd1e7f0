//! taskdeck-seed - wipe both tables and load sample projects and tasks.
//!
//! Inserts go through the services so `project.tasks` and
//! `task.subtasks` come out consistent.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck_api::{config::ServerConfig, ActionResponse, ProjectService, TaskService, ViewCache};
use taskdeck_core::{
    CreateProjectRequest, CreateTaskRequest, EventBus, ProjectRepository, Result, TaskRepository,
};
use taskdeck_db::Database;

struct SeedProject {
    title: &'static str,
    description: &'static str,
    status: &'static str,
    tags: &'static [&'static str],
    tasks: &'static [SeedTask],
}

struct SeedTask {
    title: &'static str,
    description: &'static str,
    status: &'static str,
    subtasks: &'static [SeedTask],
}

const fn task(title: &'static str, description: &'static str, status: &'static str) -> SeedTask {
    SeedTask {
        title,
        description,
        status,
        subtasks: &[],
    }
}

const SAMPLE_PROJECTS: &[SeedProject] = &[
    SeedProject {
        title: "E-commerce Website",
        description: "A modern e-commerce platform built with Next.js and Stripe integration for seamless online shopping experience.",
        status: "in-progress",
        tags: &["Next.js", "TypeScript", "Stripe", "Tailwind CSS"],
        tasks: &[
            task(
                "Set up Next.js project structure",
                "Initialize Next.js project with TypeScript and configure basic folder structure",
                "completed",
            ),
            SeedTask {
                title: "Implement product catalog",
                description: "Create product listing page with search and filter functionality",
                status: "in-progress",
                subtasks: &[
                    task(
                        "Build product search",
                        "Full-text search over product names and descriptions",
                        "in-progress",
                    ),
                    task(
                        "Add category filters",
                        "Filter the listing by category, price range and availability",
                        "todo",
                    ),
                ],
            },
            task(
                "Integrate Stripe payment",
                "Set up Stripe payment gateway for checkout process",
                "todo",
            ),
        ],
    },
    SeedProject {
        title: "Mobile Task Manager",
        description: "Cross-platform mobile app for task management with real-time synchronization and offline support.",
        status: "planning",
        tags: &["React Native", "Firebase", "Redux", "AsyncStorage"],
        tasks: &[
            task(
                "Design app wireframes",
                "Create wireframes and mockups for the mobile application",
                "completed",
            ),
            task(
                "Set up React Native environment",
                "Configure development environment and dependencies",
                "in-progress",
            ),
            task(
                "Implement offline synchronization",
                "Add offline support with data synchronization when online",
                "todo",
            ),
        ],
    },
    SeedProject {
        title: "AI Chatbot Integration",
        description: "Intelligent chatbot system with natural language processing for customer support automation.",
        status: "completed",
        tags: &["Python", "OpenAI", "FastAPI", "Docker"],
        tasks: &[
            task(
                "Research NLP libraries",
                "Evaluate different natural language processing libraries and APIs",
                "completed",
            ),
            task(
                "Implement OpenAI integration",
                "Connect with OpenAI API for intelligent responses",
                "completed",
            ),
            task(
                "Deploy to production",
                "Deploy chatbot system to production environment",
                "completed",
            ),
        ],
    },
    SeedProject {
        title: "Data Analytics Dashboard",
        description: "Real-time analytics dashboard with interactive charts and data visualization for business insights.",
        status: "review",
        tags: &["React", "D3.js", "Node.js", "PostgreSQL"],
        tasks: &[
            task(
                "Create dashboard layout",
                "Design and implement the main dashboard layout with responsive grid",
                "completed",
            ),
            task(
                "Implement data visualization charts",
                "Add interactive charts using D3.js for data representation",
                "review",
            ),
            task(
                "Set up real-time data updates",
                "Implement WebSocket connections for real-time data streaming",
                "review",
            ),
        ],
    },
    SeedProject {
        title: "IoT Device Management",
        description: "Comprehensive platform for managing and monitoring IoT devices with real-time data streaming.",
        status: "on-hold",
        tags: &["MQTT", "InfluxDB", "Grafana", "Docker"],
        tasks: &[
            task(
                "Design system architecture",
                "Plan the overall system architecture for IoT device management",
                "completed",
            ),
            task(
                "Implement MQTT broker",
                "Set up MQTT broker for device communication",
                "cancelled",
            ),
        ],
    },
    SeedProject {
        title: "Social Media Scheduler",
        description: "Automated social media posting tool with content scheduling and analytics tracking.",
        status: "in-progress",
        tags: &["Vue.js", "Node.js", "MongoDB", "Cron Jobs"],
        tasks: &[],
    },
    SeedProject {
        title: "Video Streaming Platform",
        description: "Netflix-like streaming service with user authentication, content management, and payment processing.",
        status: "planning",
        tags: &["React", "AWS S3", "CDN", "Microservices"],
        tasks: &[],
    },
    SeedProject {
        title: "Blockchain Wallet",
        description: "Secure cryptocurrency wallet with multi-coin support and DeFi integration capabilities.",
        status: "completed",
        tags: &["Solidity", "Web3.js", "Ethereum", "MetaMask"],
        tasks: &[],
    },
    SeedProject {
        title: "Learning Management System",
        description: "Online education platform with course management, progress tracking, and interactive assessments.",
        status: "review",
        tags: &["Laravel", "MySQL", "WebRTC", "Redis"],
        tasks: &[],
    },
    SeedProject {
        title: "Restaurant POS System",
        description: "Point-of-sale system for restaurants with inventory management and order tracking.",
        status: "in-progress",
        tags: &["Angular", "Express.js", "Socket.io", "Payment Gateway"],
        tasks: &[],
    },
];

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedSummary {
    projects: usize,
    tasks: usize,
}

async fn seed(
    projects: &ProjectService,
    tasks: &TaskService,
    samples: &[SeedProject],
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for sample in samples {
        let project = projects
            .create(CreateProjectRequest {
                title: Some(sample.title.to_string()),
                description: Some(sample.description.to_string()),
                status: Some(sample.status.to_string()),
                tags: Some(sample.tags.iter().map(|t| t.to_string()).collect()),
            })
            .await?;
        summary.projects += 1;
        info!(project_id = %project.id, status = %project.status, "Seeded {}", project.title);

        // (template, parent) pairs, parents before children
        let mut pending: Vec<(&SeedTask, Option<uuid::Uuid>)> =
            sample.tasks.iter().map(|t| (t, None)).collect();
        pending.reverse();

        while let Some((template, parent)) = pending.pop() {
            let created = tasks
                .create(CreateTaskRequest {
                    project_id: Some(project.id.to_string()),
                    title: Some(template.title.to_string()),
                    description: Some(template.description.to_string()),
                    status: Some(template.status.to_string()),
                    parent_task: parent.map(|p| p.to_string()),
                })
                .await?;
            summary.tasks += 1;
            pending.extend(template.subtasks.iter().rev().map(|s| (s, Some(created.id))));
        }
    }

    Ok(summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_seed=info,taskdeck_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let db = Database::connect(&config.database_url, &config.pool).await?;
    db.migrate().await?;

    let removed_tasks = db.tasks.delete_all().await?;
    let removed_projects = db.projects.delete_all().await?;
    info!(removed_projects, removed_tasks, "Cleared existing projects and tasks");

    let events = Arc::new(EventBus::default());
    let views = ViewCache::disabled(events.clone());
    let projects: Arc<dyn ProjectRepository> = Arc::new(db.projects.clone());
    let tasks: Arc<dyn TaskRepository> = Arc::new(db.tasks.clone());
    let project_service =
        ProjectService::new(projects.clone(), tasks.clone(), views.clone(), events.clone());
    let task_service = TaskService::new(projects, tasks, views, events);

    let result = seed(&project_service, &task_service, SAMPLE_PROJECTS).await;
    let failed = result.is_err();
    let outcome = ActionResponse::from(result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    db.close().await;
    if failed {
        anyhow::bail!("Seeding failed");
    }
    Ok(())
}
