//! The seed data the server loads into an empty store.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::{
  Id,
  achievement::{Achievement, AchievementType},
  curriculum::{ContentRef, CurriculumItem, DeliveryMode, ItemType},
  dataset::Dataset,
  link::{LinkKind, NewLink},
  people::{Organization, Parent, Student},
  program::{DateRange, Module, Program, Status},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(y, m, d, h, min, 0)
    .single()
    .unwrap_or_default()
}

fn span(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
  DateRange {
    start: date(start.0, start.1, start.2),
    end:   date(end.0, end.1, end.2),
  }
}

fn student(
  id: Id,
  name: &str,
  email: &str,
  birth_date: NaiveDate,
  level: u8,
  organization_id: Id,
) -> Student {
  Student {
    id,
    name: name.into(),
    email: email.into(),
    birth_date,
    level,
    organization_id: Some(organization_id),
  }
}

fn parent(id: Id, name: &str, email: &str, phone: &str) -> Parent {
  Parent { id, name: name.into(), email: email.into(), phone: phone.into() }
}

fn organization(id: Id, name: &str, email: &str, contact: &str, phone: &str) -> Organization {
  Organization {
    id,
    name: name.into(),
    email: email.into(),
    contact_person: contact.into(),
    contact_phone: phone.into(),
  }
}

fn program(id: Id, name: &str, description: &str, dates: DateRange, status: Status) -> Program {
  Program { id, name: name.into(), description: description.into(), dates, status }
}

fn module(
  id: Id,
  program_id: Id,
  name: &str,
  description: &str,
  dates: DateRange,
  status: Status,
) -> Module {
  Module {
    id,
    program_id,
    name: name.into(),
    description: description.into(),
    dates,
    status,
  }
}

fn item(
  id: Id,
  module_id: Id,
  position: u32,
  title: &str,
  description: &str,
  kind: (ItemType, DeliveryMode),
  url: &str,
) -> CurriculumItem {
  CurriculumItem {
    id,
    module_id,
    title: title.into(),
    description: description.into(),
    item_type: kind.0,
    delivery_mode: kind.1,
    position,
    content: Some(ContentRef::link(url)),
  }
}

fn achievement(id: Id, name: &str, achievement_type: AchievementType, description: &str) -> Achievement {
  Achievement {
    id,
    name: name.into(),
    achievement_type,
    description: description.into(),
    criteria: String::new(),
  }
}

impl Dataset {
  /// A small web-development academy: seven students, five organizations,
  /// six programs and the achievement library.
  pub fn fixtures() -> Self {
    use AchievementType::{Achievement as Plain, Badge, Certificate};
    use DeliveryMode::{Group, Solo};
    use ItemType::{Evaluation, Lesson, Project};

    let students = vec![
      student(1, "John Smith", "john.smith@example.com", date(2010, 5, 15), 3, 1),
      student(2, "Emma Johnson", "emma.johnson@example.com", date(2009, 8, 22), 4, 1),
      student(3, "Michael Brown", "michael.brown@example.com", date(2011, 3, 10), 2, 2),
      student(4, "Sophia Davis", "sophia.davis@example.com", date(2010, 11, 28), 3, 3),
      student(5, "William Wilson", "william.wilson@example.com", date(2009, 7, 14), 5, 2),
      student(6, "Olivia Martinez", "olivia.martinez@example.com", date(2011, 9, 3), 2, 1),
      student(7, "James Taylor", "james.taylor@example.com", date(2010, 2, 19), 3, 3),
    ];

    let parents = vec![
      parent(1, "Robert Smith", "robert.smith@example.com", "555-123-4567"),
      parent(2, "Jennifer Smith", "jennifer.smith@example.com", "555-987-6543"),
      parent(3, "David Johnson", "david.johnson@example.com", "555-111-2222"),
      parent(4, "Maria Garcia", "maria.garcia@example.com", "555-333-4444"),
      parent(5, "James Wilson", "james.wilson@example.com", "555-555-6666"),
      parent(6, "Patricia Brown", "patricia.brown@example.com", "555-777-8888"),
      parent(7, "Michael Davis", "michael.davis@example.com", "555-999-0000"),
    ];

    let organizations = vec![
      organization(1, "Tech Academy", "info@techacademy.com", "John Davis", "555-123-4567"),
      organization(2, "Code School", "contact@codeschool.com", "Sarah Wilson", "555-987-6543"),
      organization(3, "STEM Center", "info@stemcenter.org", "Michael Johnson", "555-456-7890"),
      organization(
        4,
        "Digital Learning Hub",
        "admin@digitallearninghub.com",
        "Emily Brown",
        "555-789-0123",
      ),
      organization(5, "Future Coders", "hello@futurecoders.edu", "David Martinez", "555-234-5678"),
    ];

    let programs = vec![
      program(
        1,
        "Web Development Fundamentals",
        "Learn the basics of web development with HTML, CSS, and JavaScript",
        span((2025, 6, 1), (2025, 8, 30)),
        Status::Active,
      ),
      program(
        2,
        "Mobile App Development",
        "Create mobile applications using React Native",
        span((2025, 7, 15), (2025, 10, 15)),
        Status::Draft,
      ),
      program(
        3,
        "Data Science for Beginners",
        "Introduction to data analysis and visualization",
        span((2025, 9, 1), (2025, 12, 15)),
        Status::Active,
      ),
      program(
        4,
        "Game Development with Unity",
        "Learn to create 2D and 3D games with Unity",
        span((2025, 8, 10), (2025, 11, 30)),
        Status::Upcoming,
      ),
      program(
        5,
        "Cybersecurity Essentials",
        "Learn the fundamentals of cybersecurity and network protection",
        span((2025, 10, 1), (2026, 1, 15)),
        Status::Draft,
      ),
      program(
        6,
        "Artificial Intelligence Basics",
        "Introduction to AI concepts and machine learning",
        span((2025, 11, 15), (2026, 2, 28)),
        Status::Upcoming,
      ),
    ];

    let modules = vec![
      module(
        1,
        1,
        "HTML Fundamentals",
        "Learn the basics of HTML including tags, attributes, and document structure",
        span((2025, 6, 1), (2025, 6, 30)),
        Status::Active,
      ),
      module(
        2,
        1,
        "CSS Styling",
        "Master CSS styling techniques including selectors, properties, and responsive design",
        span((2025, 7, 1), (2025, 7, 31)),
        Status::Upcoming,
      ),
      module(
        3,
        1,
        "JavaScript Basics",
        "Introduction to JavaScript programming including variables, functions, and DOM \
         manipulation",
        span((2025, 8, 1), (2025, 8, 30)),
        Status::Upcoming,
      ),
      module(
        4,
        2,
        "React Native Introduction",
        "Introduction to React Native framework and mobile app development concepts",
        span((2025, 7, 15), (2025, 8, 15)),
        Status::Upcoming,
      ),
      module(
        5,
        3,
        "Data Analysis with Python",
        "Learn to analyze data using Python libraries like Pandas and NumPy",
        span((2025, 9, 1), (2025, 9, 30)),
        Status::Draft,
      ),
    ];

    let curriculum_items = vec![
      item(
        1,
        1,
        1,
        "Introduction to HTML",
        "Learn about the history and purpose of HTML in web development",
        (Lesson, Solo),
        "/curriculum/html-intro.pdf",
      ),
      item(
        2,
        1,
        2,
        "HTML Tags and Elements",
        "Explore the most common HTML tags and how to use them properly",
        (Lesson, Solo),
        "/curriculum/html-tags.pdf",
      ),
      item(
        3,
        1,
        3,
        "HTML Forms",
        "Learn to create interactive forms using HTML form elements",
        (Lesson, Solo),
        "/curriculum/html-forms.pdf",
      ),
      item(
        4,
        1,
        4,
        "HTML Project: Create a Personal Webpage",
        "Apply your HTML knowledge by creating a personal webpage from scratch",
        (Project, Group),
        "/curriculum/html-project.pdf",
      ),
      item(
        5,
        1,
        5,
        "HTML Assessment",
        "Test your knowledge of HTML concepts and practices",
        (Evaluation, Solo),
        "/curriculum/html-assessment.pdf",
      ),
      item(
        6,
        2,
        1,
        "Introduction to CSS",
        "Learn the basics of CSS and how it works with HTML",
        (Lesson, Solo),
        "/curriculum/css-intro.pdf",
      ),
      item(
        7,
        2,
        2,
        "CSS Selectors",
        "Master different types of CSS selectors for precise styling",
        (Lesson, Solo),
        "/curriculum/css-selectors.pdf",
      ),
    ];

    let achievements = vec![
      achievement(1, "Web Developer Beginner", Badge, "Completed the basic web development curriculum"),
      achievement(2, "HTML Master", Plain, "Demonstrated proficiency in HTML"),
      achievement(3, "CSS Stylist", Plain, "Created responsive designs with CSS"),
      achievement(4, "JavaScript Coder", Plain, "Successfully implemented JavaScript functionality"),
      achievement(
        5,
        "Web Development Certificate",
        Certificate,
        "Completed the entire web development program",
      ),
      achievement(6, "JavaScript Expert", Badge, "Demonstrated advanced JavaScript skills"),
      achievement(7, "Responsive Design Master", Plain, "Created fully responsive web layouts"),
      achievement(8, "Web Accessibility Champion", Badge, "Implemented accessible web features"),
      achievement(
        9,
        "Frontend Developer Certificate",
        Certificate,
        "Completed all frontend development requirements",
      ),
      achievement(10, "Code Quality Guardian", Plain, "Maintained high code quality standards"),
    ];

    let epoch = DateTime::<Utc>::default();
    let links = [
      NewLink::new(LinkKind::ProgramAchievement, 1, 1).with_default(true),
      NewLink::new(LinkKind::ProgramAchievement, 1, 2),
      NewLink::new(LinkKind::ProgramAchievement, 1, 3),
      NewLink::new(LinkKind::ProgramAchievement, 1, 4).with_default(true),
      NewLink::new(LinkKind::ProgramAchievement, 1, 5).with_default(true),
      NewLink::new(LinkKind::ModuleAchievement, 1, 8).with_default(true),
      NewLink::new(LinkKind::ModuleAchievement, 1, 9),
      NewLink::new(LinkKind::ModuleAchievement, 1, 10).with_default(true),
      NewLink::new(LinkKind::CurriculumAchievement, 1, 8),
      NewLink::new(LinkKind::CurriculumAchievement, 1, 10),
      NewLink::new(LinkKind::StudentParent, 1, 1),
      NewLink::new(LinkKind::StudentParent, 1, 2),
      NewLink::new(LinkKind::Enrollment, 1, 1)
        .with_progress(65)
        .linked_at(at(2025, 1, 15, 10, 30)),
      NewLink::new(LinkKind::Enrollment, 1, 3).linked_at(at(2025, 3, 10, 14, 45)),
      NewLink::new(LinkKind::StudentAchievement, 1, 1).linked_at(at(2025, 2, 15, 10, 30)),
      NewLink::new(LinkKind::StudentAchievement, 1, 2).linked_at(at(2025, 3, 1, 14, 45)),
      NewLink::new(LinkKind::StudentAchievement, 1, 3).linked_at(at(2025, 3, 15, 9, 15)),
      NewLink::new(LinkKind::StudentAchievement, 1, 4).linked_at(at(2025, 4, 5, 11, 20)),
      NewLink::new(LinkKind::StudentAchievement, 1, 5).linked_at(at(2025, 4, 30, 16, 30)),
    ]
    .into_iter()
    .map(|l| l.into_link(epoch))
    .collect();

    Self {
      students,
      parents,
      organizations,
      programs,
      modules,
      curriculum_items,
      achievements,
      links,
    }
  }
}
