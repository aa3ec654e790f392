use crate::campaign::mode::DeliveryMode;
use crate::config::{CampaignConfig, TemplateKind};
use crate::roster::FieldValue;

const TEST_SUBJECT_SUFFIX: &str = " (測試模式)";
const MISSING_SCORE: &str = "未提供";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct MessageComposer {
    course_name: String,
    signature: String,
    contact_email: String,
    template: TemplateKind,
}

impl MessageComposer {
    pub fn new(campaign: &CampaignConfig) -> Self {
        Self {
            course_name: campaign.course_name.clone(),
            signature: campaign.signature.clone(),
            contact_email: campaign.contact_email.clone(),
            template: campaign.template,
        }
    }

    /// Renders the message for one recipient. `fields` feeds the grade
    /// report and is ignored by the certificate notice.
    pub fn compose(
        &self,
        mode: &DeliveryMode,
        recipient_name: &str,
        fields: &[(String, Option<FieldValue>)],
    ) -> Composed {
        let (mut subject, mut body) = match self.template {
            TemplateKind::Certificate => (self.certificate_subject(), self.certificate_body()),
            TemplateKind::Grades => (self.grades_subject(), self.grades_body(fields)),
        };

        let mut greeting = format!("{} 同學，您好：", recipient_name);
        if let DeliveryMode::Test { email, .. } = mode {
            subject.push_str(TEST_SUBJECT_SUFFIX);
            greeting.push_str(&format!(" (此為測試模式郵件，實際寄送至 {})", email));
        }
        body.insert_str(0, &format!("{}\n\n", greeting));

        Composed { subject, body }
    }

    fn certificate_subject(&self) -> String {
        format!("「{}」課程證書寄發通知｜感謝您的參與！", self.course_name)
    }

    fn certificate_body(&self) -> String {
        format!(
            "感謝您參加「{course}」課程，我們很高興與您一同探索 AI 的應用，見證您的學習成長與成果！\n\n\
             您已順利完成本次課程，並依規定完成所有作品繳交，寄發電子課程證書，以茲證明。\n\n\
             如您發現證書內容有誤或無法順利下載，請於 7 日內回信通知，我們將協助您更正或補發。\n\n\
             再次感謝您的投入與參與，我們期待未來與您在更多課程中再次相見，共同開啟更多 AI 學習與實作的可能！\n\n\
             敬祝 學習順利！\n\n\
             {signature}\n\n\
             📧 聯絡信箱：{contact}",
            course = self.course_name,
            signature = self.signature,
            contact = self.contact_email,
        )
    }

    fn grades_subject(&self) -> String {
        format!("「{}」課程成績通知", self.course_name)
    }

    fn grades_body(&self, fields: &[(String, Option<FieldValue>)]) -> String {
        let mut report = String::new();
        if fields.is_empty() {
            report.push_str("  (本次無成績資料)\n");
        }
        for (field, value) in fields {
            let value = value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| MISSING_SCORE.to_string());
            report.push_str(&format!("  - {}：{}\n", field, value));
        }

        format!(
            "以下是您在「{course}」課程的成績：\n\n\
             {report}\n\
             如對成績有任何疑問，請於 7 日內回信，我們將協助確認。\n\n\
             {signature}\n\n\
             📧 聯絡信箱：{contact}",
            course = self.course_name,
            report = report,
            signature = self.signature,
            contact = self.contact_email,
        )
    }
}
