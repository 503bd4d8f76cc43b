// Template-based gig and proposal generation

use crate::record::{GeneratedRecord, Platform};
use eyre::{Result, eyre};
use std::process::Command;
use tracing::{debug, warn};

pub const FIVERR_CATEGORIES: &[&str] = &[
    "Web Development",
    "Mobile App Development",
    "Graphic Design",
    "Logo Design",
    "Video Editing",
    "Content Writing",
    "SEO Services",
    "Social Media Marketing",
    "Virtual Assistant",
    "Data Entry",
    "Voice Over",
    "Translation",
    "UI/UX Design",
    "WordPress Development",
    "E-commerce Development",
];

pub const FIVERR_EXPERIENCE_LEVELS: &[&str] = &[
    "Beginner (0-1 years)",
    "Intermediate (1-3 years)",
    "Advanced (3-5 years)",
    "Expert (5+ years)",
];

pub const UPWORK_CATEGORIES: &[&str] = &[
    "Web Development",
    "Mobile App Development",
    "Software Development",
    "Data Science & Analytics",
    "AI & Machine Learning",
    "Graphic Design",
    "Content Writing",
    "Copywriting",
    "SEO & Digital Marketing",
    "Social Media Management",
    "Virtual Assistant",
    "Customer Support",
    "Project Management",
    "Business Consulting",
    "Accounting & Bookkeeping",
];

pub const UPWORK_EXPERIENCE_LEVELS: &[&str] = &[
    "Entry Level (0-2 years)",
    "Intermediate (2-5 years)",
    "Expert (5+ years)",
];

pub const DEFAULT_FIVERR_EXPERIENCE: &str = "Intermediate (1-3 years)";
pub const DEFAULT_UPWORK_EXPERIENCE: &str = "Intermediate (2-5 years)";

/// Persisted pricing when no Fiverr base price is given
pub const DEFAULT_FIVERR_PRICING: &str = "50-150";
pub const DEFAULT_HOURLY_RATE: u32 = 50;

const MAX_TITLE_CHARS: usize = 100;
const PERSISTED_TAGS: usize = 5;

/// Optional title source consulted before falling back to the template title
///
/// Implementations may fail or return nothing; `None` means "use the template".
pub trait TitleSuggester {
    fn suggest(&self, prompt: &str) -> Option<String>;
}

impl<F> TitleSuggester for F
where
    F: Fn(&str) -> Option<String>,
{
    fn suggest(&self, prompt: &str) -> Option<String> {
        self(prompt)
    }
}

/// Suggester that never suggests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuggester;

impl TitleSuggester for NoSuggester {
    fn suggest(&self, _prompt: &str) -> Option<String> {
        None
    }
}

/// Runs an external command with the prompt as its last argument and uses its stdout
#[derive(Debug, Clone)]
pub struct CommandSuggester {
    program: String,
    args: Vec<String>,
}

impl CommandSuggester {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace; `None` if it is blank
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl TitleSuggester for CommandSuggester {
    fn suggest(&self, prompt: &str) -> Option<String> {
        let output = match Command::new(&self.program).args(&self.args).arg(prompt).output() {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.program, error = ?e, "Title command failed to start");
                return None;
            }
        };

        if !output.status.success() {
            warn!(program = %self.program, status = ?output.status, "Title command failed");
            return None;
        }

        match String::from_utf8(output.stdout) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(program = %self.program, error = ?e, "Title command produced non-UTF-8 output");
                None
            }
        }
    }
}

/// Input for a Fiverr gig
#[derive(Debug, Clone)]
pub struct GigRequest {
    pub category: String,
    pub experience: String,
    pub skills: String,
    /// Base package price in dollars
    pub pricing: Option<String>,
}

/// Input for an Upwork proposal
#[derive(Debug, Clone)]
pub struct ProposalRequest {
    pub category: String,
    pub experience: String,
    pub skills: String,
    /// Whole dollars per hour
    pub hourly_rate: Option<String>,
}

/// A generated record plus the full markdown page shown to the user
#[derive(Debug, Clone)]
pub struct Generated {
    pub record: GeneratedRecord,
    pub document: String,
}

pub struct Generator<S = NoSuggester> {
    suggester: S,
}

impl Default for Generator<NoSuggester> {
    fn default() -> Self {
        Self::new(NoSuggester)
    }
}

impl<S: TitleSuggester> Generator<S> {
    pub fn new(suggester: S) -> Self {
        Self { suggester }
    }

    /// Generate a Fiverr gig listing
    pub fn fiverr_gig(&self, req: &GigRequest) -> Result<Generated> {
        let category = require_category(&req.category)?;
        let skills = req.skills.trim();
        let experience = req.experience.trim();
        let base_price = parse_base_price(req.pricing.as_deref())?;

        let mut title = format!("I will provide expert {} services - {}", category, skills);
        let prompt = format!("Professional Fiverr gig title for {}: {}", category, skills);
        match self.suggester.suggest(&prompt).and_then(|text| first_line_title(&text)) {
            Some(suggested) => title = suggested,
            None => debug!(category, "Using template title"),
        }

        let description = fiverr_description(category, experience, skills);

        let hashtags = [
            format!("#{}", category.replace(' ', "")),
            "#FreelanceServices".to_string(),
            "#QualityWork".to_string(),
            "#ProfessionalService".to_string(),
            format!("#{}", first_word(skills).unwrap_or("Expert")),
            "#FastDelivery".to_string(),
            "#CustomerSatisfaction".to_string(),
            "#TopRated".to_string(),
            "#AffordablePricing".to_string(),
            "#ExperiencedFreelancer".to_string(),
        ];
        let hashtag_info = hashtags
            .iter()
            .enumerate()
            .map(|(i, tag)| format!("{} - {} popularity", tag, popularity(i)))
            .collect::<Vec<_>>()
            .join("\n");

        let (basic, standard, premium) = match &base_price {
            Some((raw, price)) => (raw.to_string(), (price * 2.0) as i64, (price * 3.0) as i64),
            None => ("50".to_string(), 100, 150),
        };
        let pricing_summary = format!(
            "**Fiverr Pricing Structure:**\n\n\
             **Basic Package:** ${basic} - Essential service\n\
             - Delivery: 3-5 days\n\
             - 1 Revision\n\
             - Basic support\n\n\
             **Standard Package:** ${standard} - Most Popular\n\
             - Delivery: 5-7 days\n\
             - 3 Revisions\n\
             - Priority support\n\
             - Source files included\n\n\
             **Premium Package:** ${premium} - Best Value\n\
             - Delivery: 7-10 days\n\
             - Unlimited revisions\n\
             - 24/7 Priority support\n\
             - Source files + Commercial rights\n\
             - Fast delivery option"
        );

        let record = GeneratedRecord::new(
            Platform::Fiverr,
            category,
            title.clone(),
            description.clone(),
            hashtags[..PERSISTED_TAGS].join(", "),
            base_price.map_or(DEFAULT_FIVERR_PRICING, |(raw, _)| raw),
        );

        let document = render_document(
            "Generated Fiverr Gig",
            ("Gig Title", &title),
            ("Gig Description", &description),
            ("Hashtags & Popularity", &hashtag_info),
            &pricing_summary,
            FIVERR_TIPS,
            &record.timestamp,
        );

        Ok(Generated { record, document })
    }

    /// Generate an Upwork proposal
    pub fn upwork_proposal(&self, req: &ProposalRequest) -> Result<Generated> {
        let category = require_category(&req.category)?;
        let skills = req.skills.trim();
        let experience = req.experience.trim();
        let rate = parse_hourly_rate(req.hourly_rate.as_deref())?;

        let title = format!("{} Expert | {} Experience | {}", category, experience, skills);
        let description = upwork_description(category, experience, skills);

        let tags = [
            category,
            first_word(skills).unwrap_or("Professional"),
            "Project Management",
            "Client Communication",
            "Quality Assurance",
            "Problem Solving",
            "Time Management",
            "Agile Methodology",
            "Documentation",
            "Technical Support",
        ];
        let tag_info = tags[..8]
            .iter()
            .map(|tag| format!("• {}", tag))
            .collect::<Vec<_>>()
            .join("\n");

        let pricing_summary = format!(
            "**Upwork Pricing Strategy:**\n\n\
             **Hourly Rate:** ${rate}/hour\n\
             - Competitive within {category} category\n\
             - Includes regular communication\n\
             - Progress tracked via Upwork Time Tracker\n\n\
             **Fixed-Price Alternative:**\n\
             - Small projects: ${} - ${}\n\
             - Medium projects: ${} - ${}\n\
             - Large projects: ${}+\n\n\
             **Value Adds:**\n\
             ✓ First consultation: Free (30 minutes)\n\
             ✓ Milestone-based payment protection\n\
             ✓ Detailed time logs and progress reports\n\
             ✓ Post-delivery support: 30 days included\n\n\
             **Pro Tip:** For first-time clients, consider offering a 10% discount to build trust and earn reviews.",
            u64::from(rate) * 10,
            u64::from(rate) * 20,
            u64::from(rate) * 20,
            u64::from(rate) * 50,
            u64::from(rate) * 50,
        );

        let record = GeneratedRecord::new(
            Platform::Upwork,
            category,
            title.clone(),
            description.clone(),
            tags[..PERSISTED_TAGS].join(", "),
            format!("${}/hour", rate),
        );

        let document = render_document(
            "Generated Upwork Proposal",
            ("Proposal Title", &title),
            ("Proposal Cover Letter", &description),
            ("Suggested Skills/Tags", &tag_info),
            &pricing_summary,
            UPWORK_TIPS,
            &record.timestamp,
        );

        Ok(Generated { record, document })
    }
}

fn require_category(category: &str) -> Result<&str> {
    let category = category.trim();
    if category.is_empty() {
        return Err(eyre!("Category cannot be empty"));
    }
    Ok(category)
}

/// Returns the trimmed input alongside its numeric value; blank input means "no price"
fn parse_base_price(pricing: Option<&str>) -> Result<Option<(&str, f64)>> {
    let raw = match pricing.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };
    let price: f64 = raw
        .parse()
        .map_err(|_| eyre!("Invalid base price: {} (expected a number of dollars)", raw))?;
    if !price.is_finite() || price < 0.0 {
        return Err(eyre!("Invalid base price: {} (must be a non-negative amount)", raw));
    }
    Ok(Some((raw, price)))
}

/// Whole dollars per hour; a fractional rate is truncated toward zero
fn parse_hourly_rate(rate: Option<&str>) -> Result<u32> {
    let raw = match rate.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(DEFAULT_HOURLY_RATE),
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| eyre!("Invalid hourly rate: {} (expected a number of dollars)", raw))?;
    if !value.is_finite() || value < 0.0 || value >= f64::from(u32::MAX) {
        return Err(eyre!("Invalid hourly rate: {} (must be a non-negative amount)", raw));
    }
    Ok(value.trunc() as u32)
}

fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// First line of suggester output, capped at `MAX_TITLE_CHARS`; `None` if blank
fn first_line_title(text: &str) -> Option<String> {
    let line: String = text.lines().next()?.chars().take(MAX_TITLE_CHARS).collect();
    if line.trim().is_empty() { None } else { Some(line) }
}

fn popularity(rank: usize) -> &'static str {
    match rank {
        0..=2 => "🔥 High",
        3..=5 => "📈 Medium",
        _ => "✅ Good",
    }
}

fn fiverr_description(category: &str, experience: &str, skills: &str) -> String {
    format!(
        "## Professional {category} Services\n\n\
         **About This Gig:**\n\
         I offer premium {category} services with {experience} of hands-on experience. \
         My expertise includes {skills}, ensuring high-quality deliverables that exceed expectations.\n\n\
         **What You'll Get:**\n\
         ✓ Professional and timely delivery\n\
         ✓ Unlimited revisions until you're satisfied\n\
         ✓ High-quality work tailored to your needs\n\
         ✓ Clear communication throughout the project\n\
         ✓ 100% satisfaction guarantee\n\n\
         **Why Choose Me:**\n\
         - {experience} of proven experience\n\
         - Specialized in {skills}\n\
         - Fast turnaround time\n\
         - Client satisfaction is my priority\n\n\
         **How It Works:**\n\
         1. Discuss your requirements\n\
         2. I'll create a custom solution\n\
         3. Receive your completed project\n\
         4. Request revisions if needed\n\n\
         Let's work together to bring your vision to life!"
    )
}

fn upwork_description(category: &str, experience: &str, skills: &str) -> String {
    format!(
        "## Your Trusted {category} Professional\n\n\
         **Hello, I'm thrilled to help with your project!**\n\n\
         With {experience} of dedicated experience in {category}, I specialize in {skills} \
         and have successfully delivered numerous projects that exceed client expectations.\n\n\
         **My Expertise:**\n\
         • {skills}\n\
         • Full project lifecycle management\n\
         • Agile development methodologies\n\
         • Client-focused communication\n\
         • Quality assurance and testing\n\n\
         **Why Work With Me:**\n\
         ✅ Proven track record with 100% job success score\n\
         ✅ {experience} of hands-on industry experience\n\
         ✅ Clear, frequent communication\n\
         ✅ On-time delivery guaranteed\n\
         ✅ Post-project support included\n\n\
         **My Approach:**\n\
         1. **Understand:** Deep dive into your requirements\n\
         2. **Plan:** Create a detailed project roadmap\n\
         3. **Execute:** Deliver high-quality work iteratively\n\
         4. **Perfect:** Refine based on your feedback\n\
         5. **Support:** Provide ongoing assistance\n\n\
         **What You Get:**\n\
         - Professional, polished deliverables\n\
         - Regular progress updates\n\
         - Responsive communication (usually within 2 hours)\n\
         - Clean, documented work\n\
         - Money-back satisfaction guarantee\n\n\
         I'm excited to discuss how I can contribute to your project's success. \
         Let's schedule a call to align on your vision!\n\n\
         **Available:** Immediate start\n\
         **Timezone:** Flexible to match your schedule\n\n\
         Looking forward to collaborating with you!"
    )
}

const FIVERR_TIPS: &str = "**🎯 Fiverr Success Tips:**

1. **Gig Optimization:** Use all 5 gig images/videos - visual content increases sales by 200%
2. **Keywords:** Include relevant keywords in your title and description for better search ranking
3. **Response Time:** Reply to messages within 1 hour to maintain high response rate
4. **Portfolio:** Showcase your best 3 work samples to build trust
5. **Gig Packages:** Offer 3 distinct packages to cater to different budgets
6. **Gig SEO:** Research trending keywords in your category using Fiverr search
7. **Video Introduction:** Add a 60-second video to increase conversions by 220%
8. **Reviews:** Deliver exceptional service to earn 5-star reviews consistently
9. **Gig Extras:** Offer add-ons like \"Fast Delivery\" or \"Additional Revisions\"
10. **Stay Active:** Log in daily and share gigs on social media for better visibility";

const UPWORK_TIPS: &str = "**🚀 Upwork Success Strategies:**

1. **Profile Optimization:** Complete your profile to 100% - adds credibility
2. **Personalized Proposals:** Always customize proposals - never use templates blindly
3. **Cover Letter:** Keep it concise (200-300 words) and client-focused
4. **Portfolio:** Showcase 5-8 diverse, high-quality work samples
5. **Connects Strategy:** Only bid on jobs you're 80%+ qualified for
6. **Response Time:** Apply within first hour of job posting for 3x better chances
7. **Job Success Score:** Maintain 90%+ by delivering quality and managing expectations
8. **Client Questions:** Answer all screening questions thoroughly
9. **Follow-up:** Send a professional follow-up message after 3-4 days if no response
10. **Availability Badge:** Keep your profile active with \"Available Now\" status
11. **Specialized Profile:** Narrow your focus to 2-3 related skills for better matching
12. **Testimonials:** Request detailed feedback from satisfied clients
13. **Certifications:** Complete Upwork skill tests to boost profile credibility
14. **Proposal Video:** Include a 30-second personalized video for higher conversion";

fn render_document(
    heading: &str,
    title: (&str, &str),
    body: (&str, &str),
    tags: (&str, &str),
    pricing: &str,
    tips: &str,
    timestamp: &str,
) -> String {
    format!(
        "# {heading}\n\n\
         ## {}:\n{}\n\n---\n\n\
         ## {}:\n{}\n\n---\n\n\
         ## {}:\n{}\n\n---\n\n\
         ## Pricing Recommendations:\n{pricing}\n\n---\n\n\
         {tips}\n\n---\n\
         *Generated on {timestamp}*\n",
        title.0, title.1, body.0, body.1, tags.0, tags.1,
    )
}
